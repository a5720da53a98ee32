//! Adjustment resolution — one grammar for every scalar argument.
//!
//! Every handler that adjusts a value feeds its raw token through
//! [`resolve`] with a [`Domain`] describing the property: enumerated
//! properties use 1-based indices and may wrap, mixer-style properties
//! take 0-127 input scaled onto their range, and literal properties (tempo,
//! beat positions) take the number as-is. On top of that sit relative steps
//! (`<`, `>5`), `RND` with an optional sub-range, `RESET`, and named
//! value-list entries. An unrecognized token resolves to `None` and the
//! property is left untouched.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// How numeric input maps onto the property's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// 1-based index over an enumerated range; relative steps are whole
    /// steps and wrap when the domain says so.
    Index,
    /// 0-127 controller input scaled onto `[min, max]`; a relative step of 1
    /// moves by 1/127 of the range.
    Midi,
    /// The literal number, clamped to `[min, max]`.
    Direct,
}

/// Value domain of one adjustable property.
#[derive(Debug, Clone, Copy)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
    /// Reset target; `None` for quantized properties, where RESET is a no-op.
    pub default: Option<f64>,
    /// Relative steps wrap instead of clamping (enumerated pages).
    pub wrap: bool,
    pub scale: Scale,
}

impl Domain {
    /// Enumerated domain over `count` entries starting at 0.
    pub fn index(count: usize, wrap: bool) -> Domain {
        Domain {
            min: 0.0,
            max: count.saturating_sub(1) as f64,
            default: None,
            wrap,
            scale: Scale::Index,
        }
    }

    /// Continuous domain driven by 0-127 input.
    pub fn midi(min: f64, max: f64, default: Option<f64>) -> Domain {
        Domain {
            min,
            max,
            default,
            wrap: false,
            scale: Scale::Midi,
        }
    }

    /// Continuous domain driven by literal numbers.
    pub fn direct(min: f64, max: f64, default: Option<f64>) -> Domain {
        Domain {
            min,
            max,
            default,
            wrap: false,
            scale: Scale::Direct,
        }
    }

    /// Size of one relative step in value units.
    fn step_unit(&self) -> f64 {
        match self.scale {
            Scale::Index => 1.0,
            Scale::Midi => (self.max - self.min) / 127.0,
            Scale::Direct => 1.0,
        }
    }

    /// Convert a number in input units (index, controller value, or literal)
    /// to a clamped absolute value.
    fn from_input(&self, n: f64) -> f64 {
        match self.scale {
            Scale::Index => {
                let span = (self.max - self.min) + 1.0;
                let ix = n.round().clamp(1.0, span);
                self.min + (ix - 1.0)
            }
            Scale::Midi => {
                let n = n.clamp(0.0, 127.0);
                self.min + n / 127.0 * (self.max - self.min)
            }
            Scale::Direct => n.clamp(self.min, self.max),
        }
    }

    /// Bounds of the input-unit space, for RND sub-ranges.
    fn input_bounds(&self) -> (f64, f64) {
        match self.scale {
            Scale::Index => (1.0, (self.max - self.min) + 1.0),
            Scale::Midi => (0.0, 127.0),
            Scale::Direct => (self.min, self.max),
        }
    }
}

/// Resolve `token` against `current` within `domain`.
///
/// Returns the new absolute value, or `None` when the token does not apply
/// (unknown word, RESET without a default, empty token). The result is
/// always inside `[min, max]`.
pub fn resolve(
    token: &str,
    current: f64,
    domain: &Domain,
    value_list: Option<&[&str]>,
    rng: &mut ChaCha8Rng,
) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(values) = value_list {
        if let Some(ix) = values.iter().position(|v| v.eq_ignore_ascii_case(token)) {
            return Some((ix as f64).clamp(domain.min, domain.max));
        }
    }

    if token.eq_ignore_ascii_case("RESET") {
        return domain.default;
    }

    if let Some(rest) = strip_keyword(token, "RND") {
        return Some(resolve_random(rest, domain, rng));
    }

    if let Some(rest) = token.strip_prefix('<') {
        return resolve_relative(rest, -1.0, current, domain);
    }
    if let Some(rest) = token.strip_prefix('>') {
        return resolve_relative(rest, 1.0, current, domain);
    }

    match token.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(domain.from_input(n)),
        _ => None,
    }
}

/// ON/OFF/toggle argument. Any token other than ON or OFF toggles.
pub fn resolve_toggle(token: &str, current: bool) -> bool {
    match token.trim() {
        t if t.eq_ignore_ascii_case("ON") => true,
        t if t.eq_ignore_ascii_case("OFF") => false,
        _ => !current,
    }
}

fn strip_keyword<'a>(token: &'a str, keyword: &str) -> Option<&'a str> {
    if token.len() >= keyword.len() && token[..keyword.len()].eq_ignore_ascii_case(keyword) {
        Some(&token[keyword.len()..])
    } else {
        None
    }
}

fn resolve_relative(rest: &str, sign: f64, current: f64, domain: &Domain) -> Option<f64> {
    let magnitude = if rest.is_empty() {
        1.0
    } else {
        match rest.trim().parse::<f64>() {
            Ok(m) if m.is_finite() && m >= 0.0 => m,
            _ => return None,
        }
    };
    let delta = sign * magnitude * domain.step_unit();
    if domain.wrap {
        let span = (domain.max - domain.min) + 1.0;
        let stepped = (current - domain.min + delta).rem_euclid(span);
        Some(domain.min + stepped)
    } else {
        Some((current + delta).clamp(domain.min, domain.max))
    }
}

/// `RND` over the full input space, or `RND<a>-<b>` over a sub-range.
/// Invalid sub-ranges (reversed, out of bounds, unparseable) fall back to
/// the full range.
fn resolve_random(rest: &str, domain: &Domain, rng: &mut ChaCha8Rng) -> f64 {
    let (full_lo, full_hi) = domain.input_bounds();
    let (lo, hi) = parse_sub_range(rest, full_lo, full_hi).unwrap_or((full_lo, full_hi));
    let n = if domain.scale == Scale::Direct {
        rng.gen_range(lo..=hi)
    } else {
        // Index and Midi input spaces are integral.
        rng.gen_range(lo as i64..=hi as i64) as f64
    };
    domain.from_input(n)
}

fn parse_sub_range(rest: &str, full_lo: f64, full_hi: f64) -> Option<(f64, f64)> {
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    let (a, b) = rest.split_once('-')?;
    let lo = a.trim().parse::<f64>().ok()?;
    let hi = b.trim().parse::<f64>().ok()?;
    if lo >= hi || lo < full_lo || hi > full_hi {
        return None;
    }
    Some((lo, hi))
}
