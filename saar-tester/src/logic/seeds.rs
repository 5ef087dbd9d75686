use anyhow::{Context, Result, bail};

const DEFAULT_SEED: u64 = 1337;

/// Resolve CLI seed tokens into unique seeds, preserving order.
///
/// Accepts decimal integers (negative values use their magnitude) and
/// `0x`-prefixed hex.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        let seed = parse_seed(token)?;
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn parse_seed(token: &str) -> Result<u64> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .with_context(|| format!("invalid hex seed: {token}"));
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    bail!("Unrecognized seed token: {token}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_decimal_negative_and_hex() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xff"])).unwrap();
        assert_eq!(seeds, vec![42, 7, 255]);
    }

    #[test]
    fn deduplicates_in_order() {
        let seeds = resolve_seed_inputs(&tokens(&["3", "1", "3", "0x1"])).unwrap();
        assert_eq!(seeds, vec![3, 1]);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn rejects_garbage() {
        let err = resolve_seed_inputs(&tokens(&["river"])).unwrap_err();
        assert!(err.to_string().contains("river"));
        assert!(resolve_seed_inputs(&tokens(&["0xzz"])).is_err());
    }
}
