//! Plain-text chain listing.

use std::io::{self, Write};

use fc_core::{Chain, Particle};

/// Writes `(k) id id ...` per chain followed by the sum of all member ids,
/// a quick fingerprint for comparing runs.
pub fn write_chain_listing<W: Write>(
    out: &mut W,
    chains: &[Chain],
    particles: &[Particle],
) -> io::Result<()> {
    let mut sum = 0usize;
    for (k, chain) in chains.iter().enumerate() {
        write!(out, "({k})")?;
        for &member in chain {
            write!(out, " {member}")?;
            sum += particles.get(member).map_or(member, |p| p.id);
        }
        writeln!(out)?;
    }
    writeln!(out, "Sum of chain member ids = {sum}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn lists_chains_and_id_sum() {
        let particles: Vec<Particle> = (0..6)
            .map(|i| Particle::new(i, 1.0, Vector3::zeros()))
            .collect();
        let chains = vec![vec![1, 2, 3], vec![5, 4, 0]];
        let mut buf = Vec::new();
        write_chain_listing(&mut buf, &chains, &particles).expect("listing");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "(0) 1 2 3\n(1) 5 4 0\nSum of chain member ids = 15\n");
    }
}
