//! Class-name pool for random project setups.
//!
//! The pool is a newline-delimited list of candidate class names. A bundled
//! default ships with the crate; an external file can be supplied instead.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use super::CLASS_COUNT;

/// Bundled default class-name pool.
pub const DEFAULT_CLASS_POOL: &str = include_str!("../../assets/classes.txt");

/// Errors raised while loading or drawing from the class-name pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to read the pool file.
    #[error("Failed to read class pool {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The pool does not contain enough distinct names for one project.
    #[error("Class pool holds {distinct} distinct names; {CLASS_COUNT} are required")]
    TooFewNames { distinct: usize },
}

/// Parse a newline-delimited pool, dropping blank lines and edge whitespace.
pub fn parse_pool(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load a pool from an external newline-delimited file.
pub fn load_pool(path: &Path) -> Result<Vec<String>, PoolError> {
    let text = std::fs::read_to_string(path).map_err(|source| PoolError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_pool(&text))
}

/// Draw three pairwise-distinct class names uniformly from `pool`.
///
/// Duplicate draws (including case-insensitive repeats in the pool itself)
/// are rejected and redrawn, matching a sample-without-replacement over the
/// distinct names.
pub fn draw_random_classes<R: Rng>(
    pool: &[String],
    rng: &mut R,
) -> Result<[String; CLASS_COUNT], PoolError> {
    let distinct = count_distinct(pool);
    if distinct < CLASS_COUNT {
        return Err(PoolError::TooFewNames { distinct });
    }

    let mut picked: Vec<String> = Vec::with_capacity(CLASS_COUNT);
    while picked.len() < CLASS_COUNT {
        let candidate = pool
            .choose(rng)
            .expect("pool verified non-empty above")
            .clone();
        if !picked
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&candidate))
        {
            picked.push(candidate);
        }
    }
    let mut drawn = picked.into_iter();
    Ok(std::array::from_fn(|_| {
        drawn.next().expect("exactly CLASS_COUNT names drawn")
    }))
}

fn count_distinct(pool: &[String]) -> usize {
    let mut seen: Vec<String> = Vec::new();
    for name in pool {
        let lowered = name.to_ascii_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parse_skips_blank_lines_and_whitespace() {
        let pool = parse_pool("cat\n\n  dog \nbird\n");
        assert_eq!(pool, vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn draws_three_distinct_names() {
        let pool = parse_pool("cat\ndog\nbird\nfish\nhouse");
        let mut rng = StdRng::seed_from_u64(7);
        let classes = draw_random_classes(&pool, &mut rng).unwrap();
        for (idx, name) in classes.iter().enumerate() {
            assert!(pool.contains(name));
            assert!(
                !classes[idx + 1..]
                    .iter()
                    .any(|other| other.eq_ignore_ascii_case(name))
            );
        }
    }

    #[test]
    fn redraws_past_duplicates_in_the_pool() {
        // Many repeated entries still leave three distinct names.
        let pool = parse_pool("cat\ncat\nCat\ndog\ndog\nbird");
        let mut rng = StdRng::seed_from_u64(1);
        let classes = draw_random_classes(&pool, &mut rng).unwrap();
        let mut lowered: Vec<String> = classes.iter().map(|n| n.to_ascii_lowercase()).collect();
        lowered.sort();
        assert_eq!(lowered, vec!["bird", "cat", "dog"]);
    }

    #[test]
    fn rejects_pool_with_too_few_distinct_names() {
        let pool = parse_pool("cat\nCAT\ndog");
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            draw_random_classes(&pool, &mut rng),
            Err(PoolError::TooFewNames { distinct: 2 })
        ));
    }

    #[test]
    fn loads_pool_from_external_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.txt");
        std::fs::write(&path, "sun\nmoon\nstar\n").unwrap();
        assert_eq!(load_pool(&path).unwrap(), vec!["sun", "moon", "star"]);
        assert!(matches!(
            load_pool(&dir.path().join("missing.txt")),
            Err(PoolError::Read { .. })
        ));
    }

    #[test]
    fn bundled_pool_is_large_enough() {
        let pool = parse_pool(DEFAULT_CLASS_POOL);
        assert!(pool.len() >= CLASS_COUNT);
    }
}
