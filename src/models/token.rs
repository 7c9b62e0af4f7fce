use crate::error::PayGridError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Fractional digits carried by the native asset (lamports per SOL).
pub const NATIVE_DECIMALS: u32 = 9;

/// Fractional digits carried by standard SPL tokens in this design.
pub const SPL_DECIMALS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedToken {
    pub symbol: &'static str,
    pub mint: &'static str,
    pub decimals: u32,
}

/// The canonical supported-token table. Every amount conversion in the
/// system goes through these entries; nothing else may hard-code a divisor.
pub const SUPPORTED_TOKENS: &[SupportedToken] = &[
    SupportedToken {
        symbol: "SOL",
        mint: "11111111111111111111111111111111",
        decimals: NATIVE_DECIMALS,
    },
    SupportedToken {
        symbol: "USDC",
        mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        decimals: SPL_DECIMALS,
    },
    SupportedToken {
        symbol: "BONK",
        mint: "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
        decimals: SPL_DECIMALS,
    },
];

pub fn resolve(symbol: &str) -> Result<&'static SupportedToken, PayGridError> {
    SUPPORTED_TOKENS
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| PayGridError::UnsupportedToken(symbol.to_string()))
}

/// Convert a human-unit amount to the asset's smallest denomination unit.
/// Rejects amounts with more fractional digits than the asset carries
/// instead of silently rounding.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<u64, PayGridError> {
    let factor = Decimal::from(10u64.pow(decimals));
    let scaled = amount
        .checked_mul(factor)
        .ok_or_else(|| PayGridError::InvalidAmount(amount.to_string()))?;

    if !scaled.fract().is_zero() || scaled.is_sign_negative() {
        return Err(PayGridError::InvalidAmount(amount.to_string()));
    }

    scaled
        .to_u64()
        .ok_or_else(|| PayGridError::InvalidAmount(amount.to_string()))
}

/// Convert a smallest-denomination amount back to human units. Exact for
/// any value a `u64` can hold.
pub fn from_base_units(base_units: u64, decimals: u32) -> Decimal {
    Decimal::from_i128_with_scale(base_units as i128, decimals).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn resolves_known_symbols() {
        assert_eq!(resolve("SOL").unwrap().decimals, 9);
        assert_eq!(resolve("usdc").unwrap().decimals, 6);
        assert_eq!(
            resolve("BONK").unwrap().mint,
            "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"
        );
    }

    #[test]
    fn rejects_unknown_symbol() {
        let err = resolve("DOGE").unwrap_err();
        assert!(matches!(err, PayGridError::UnsupportedToken(s) if s == "DOGE"));
    }

    #[test]
    fn native_round_trip_is_exact() {
        // 9 fractional digits must survive the round trip bit-for-bit
        for raw in ["0.123456789", "1", "0.000000001", "12345.000000321"] {
            let amount = dec(raw);
            let base = to_base_units(amount, NATIVE_DECIMALS).unwrap();
            assert_eq!(from_base_units(base, NATIVE_DECIMALS), amount);
        }
    }

    #[test]
    fn spl_round_trip_is_exact() {
        for raw in ["0.123456", "250", "0.000001", "99.5"] {
            let amount = dec(raw);
            let base = to_base_units(amount, SPL_DECIMALS).unwrap();
            assert_eq!(from_base_units(base, SPL_DECIMALS), amount);
        }
    }

    #[test]
    fn excess_precision_is_rejected() {
        assert!(matches!(
            to_base_units(dec("0.0000000001"), NATIVE_DECIMALS),
            Err(PayGridError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_base_units(dec("0.1234567"), SPL_DECIMALS),
            Err(PayGridError::InvalidAmount(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(matches!(
            to_base_units(dec("-1"), SPL_DECIMALS),
            Err(PayGridError::InvalidAmount(_))
        ));
    }

    #[test]
    fn base_unit_examples() {
        assert_eq!(to_base_units(dec("0.1"), NATIVE_DECIMALS).unwrap(), 100_000_000);
        assert_eq!(to_base_units(dec("2.5"), SPL_DECIMALS).unwrap(), 2_500_000);
        assert_eq!(from_base_units(1, NATIVE_DECIMALS), dec("0.000000001"));
    }
}
