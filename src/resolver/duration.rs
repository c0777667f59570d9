/* src/resolver/duration.rs */

//!
//! Parser for `<number><unit>` duration strings such as `300ms`, `1.5s` or `2h45m`.

use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this are truncated; they are below nanosecond precision.
const MAX_FRACTION_DIGITS: usize = 18;

fn unit_nanos(unit: &str) -> Option<u128> {
	match unit {
		"ns" => Some(1),
		"us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
		"ms" => Some(NANOS_PER_MILLI),
		"s" => Some(NANOS_PER_SEC),
		"m" => Some(60 * NANOS_PER_SEC),
		"h" => Some(3600 * NANOS_PER_SEC),
		_ => None,
	}
}

/// Parses a duration made of one or more `<decimal><unit>` segments.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
/// is accepted without a unit. Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
	let mut rest = input.strip_prefix('+').unwrap_or(input);
	if rest.starts_with('-') {
		return Err("negative durations are not supported".to_string());
	}
	if rest == "0" {
		return Ok(Duration::ZERO);
	}
	if rest.is_empty() {
		return Err("empty duration".to_string());
	}

	let mut total: u128 = 0;
	while !rest.is_empty() {
		let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
		let (int_part, after_int) = rest.split_at(int_len);

		let (frac_part, after_frac) = match after_int.strip_prefix('.') {
			Some(tail) => {
				let len = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
				tail.split_at(len)
			}
			None => ("", after_int),
		};

		if int_part.is_empty() && frac_part.is_empty() {
			return Err(format!("invalid duration {input:?}"));
		}

		let unit_len = after_frac
			.find(|c: char| c.is_ascii_digit() || c == '.')
			.unwrap_or(after_frac.len());
		let (unit, tail) = after_frac.split_at(unit_len);
		if unit.is_empty() {
			return Err(format!("missing unit in duration {input:?}"));
		}
		let scale = unit_nanos(unit).ok_or_else(|| format!("unknown unit {unit:?} in duration {input:?}"))?;

		let whole: u128 = if int_part.is_empty() {
			0
		} else {
			int_part
				.parse()
				.map_err(|_| format!("invalid duration {input:?}"))?
		};
		let mut segment = whole
			.checked_mul(scale)
			.ok_or_else(|| format!("duration {input:?} out of range"))?;

		let frac_digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
		if !frac_digits.is_empty() {
			let numerator: u128 = frac_digits
				.parse()
				.map_err(|_| format!("invalid duration {input:?}"))?;
			let denominator = 10u128.pow(frac_digits.len() as u32);
			segment = segment
				.checked_add(numerator * scale / denominator)
				.ok_or_else(|| format!("duration {input:?} out of range"))?;
		}

		total = total
			.checked_add(segment)
			.ok_or_else(|| format!("duration {input:?} out of range"))?;
		rest = tail;
	}

	let nanos = u64::try_from(total).map_err(|_| format!("duration {input:?} out of range"))?;
	Ok(Duration::from_nanos(nanos))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_single_units() {
		assert_eq!(parse_duration("10ns").unwrap(), Duration::from_nanos(10));
		assert_eq!(parse_duration("7us").unwrap(), Duration::from_micros(7));
		assert_eq!(parse_duration("7µs").unwrap(), Duration::from_micros(7));
		assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
		assert_eq!(parse_duration("60s").unwrap(), Duration::from_secs(60));
		assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
		assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
	}

	#[test]
	fn test_parse_compound_and_fractional() {
		assert_eq!(
			parse_duration("2h45m").unwrap(),
			Duration::from_secs(2 * 3600 + 45 * 60)
		);
		assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
		assert_eq!(parse_duration(".5m").unwrap(), Duration::from_secs(30));
		assert_eq!(parse_duration("1m30.25s").unwrap(), Duration::from_millis(90_250));
		assert_eq!(parse_duration("+5s").unwrap(), Duration::from_secs(5));
	}

	#[test]
	fn test_parse_zero() {
		assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
		assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
	}

	#[test]
	fn test_parse_rejects_malformed() {
		assert!(parse_duration("").is_err());
		assert!(parse_duration("10").is_err());
		assert!(parse_duration("abc").is_err());
		assert!(parse_duration("10 s").is_err());
		assert!(parse_duration("5d").is_err());
		assert!(parse_duration(".s").is_err());
		assert!(parse_duration("-5s").is_err());
	}

	#[test]
	fn test_parse_rejects_overflow() {
		assert!(parse_duration("99999999999999999999h").is_err());
		assert!(parse_duration("6000000h").is_err());
		assert!(parse_duration("94522879700260684295381835.999999999999999999h").is_err());
		assert!(parse_duration("5124095h.9h").is_err());
	}
}
