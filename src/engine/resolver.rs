//! Text preprocessing: bound names become decimal literals before parsing.

use crate::decimal::plain_string;
use crate::engine::ParameterBag;
use crate::error::CalcError;
use crate::functions::rounding::ROUNDING_MODE_CONSTANTS;
use crate::options::CalculationOptions;
use std::f64::consts;

/// Placeholder for the comma separated values of every bound parameter.
pub const ALL_PARAMS: &str = "ALL_PARAMS";

struct Substitution {
    name: Vec<char>,
    value: String,
}

impl Substitution {
    fn new(name: &str, value: String) -> Self {
        Self {
            name: name.chars().collect(),
            value,
        }
    }

    /// `\bNAME\b(?!\()`, ignoring ASCII case.
    fn matches_at(&self, chars: &[char], at: usize) -> bool {
        let end = at + self.name.len();
        !self.name.is_empty()
            && end <= chars.len()
            && chars[at..end]
                .iter()
                .zip(&self.name)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
            && is_boundary(chars, at)
            && is_boundary(chars, end)
            && chars.get(end) != Some(&'(')
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit() || c == '_'
}

fn is_boundary(chars: &[char], at: usize) -> bool {
    let before = at > 0 && is_word_char(chars[at - 1]);
    let after = chars.get(at).is_some_and(|c| is_word_char(*c));
    before != after
}

fn value_text(value: &Option<bigdecimal::BigDecimal>) -> String {
    value.as_ref().map_or_else(|| "0".to_string(), plain_string)
}

/// Rewrites `text` so that it only contains numbers, operators and function calls.
///
/// Candidates are tried at every position in this order: bound names (insertion
/// order), `ALL_PARAMS`, the rounding mode names, `PI` and `E`. Inserted text is
/// never scanned again, so a value can not be substituted twice.
pub fn resolve(
    text: &str,
    bindings: &ParameterBag,
    options: &CalculationOptions,
) -> Result<String, CalcError> {
    let pi = plain_string(&options.calculation().from_float(consts::PI, "PI")?);
    let e = plain_string(&options.calculation().from_float(consts::E, "E")?);

    let mut substitutions: Vec<Substitution> = bindings
        .iter()
        .map(|(name, value)| Substitution::new(name, value_text(value)))
        .collect();
    let all_params = bindings.values().map(value_text).collect::<Vec<_>>().join(",");
    substitutions.push(Substitution::new(ALL_PARAMS, all_params));
    for (name, code) in ROUNDING_MODE_CONSTANTS {
        substitutions.push(Substitution::new(name, code.to_string()));
    }
    substitutions.push(Substitution::new("PI", pi.clone()));
    substitutions.push(Substitution::new("E", e));

    let chars: Vec<char> = text.chars().collect();
    let mut resolved = String::with_capacity(text.len());
    let mut pos = 0;
    while pos < chars.len() {
        if let Some(hit) = substitutions.iter().find(|s| s.matches_at(&chars, pos)) {
            resolved.push_str(&hit.value);
            pos += hit.name.len();
            continue;
        }
        match chars[pos] {
            'π' => resolved.push_str(&pi),
            '²' => resolved.push_str("^2"),
            '³' => resolved.push_str("^3"),
            c => resolved.push(c),
        }
        pos += 1;
    }

    options.trace(format_args!(
        "Resolved expression '{}' to '{}'",
        text, resolved
    ));
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn bag(entries: &[(&str, Option<&str>)]) -> ParameterBag {
        entries
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.map(|v| BigDecimal::from_str(v).unwrap()),
                )
            })
            .collect()
    }

    #[test]
    fn test_parameters_are_substituted_on_word_boundaries() {
        let options = CalculationOptions::new("");
        let bindings = bag(&[("a", Some("10")), ("b", Some("2.1")), ("ab", Some("-3"))]);
        let resolved = resolve("a + B * ab - abc", &bindings, &options).unwrap();
        assert_eq!(resolved, "10 + 2.1 * -3 - abc");
    }

    #[test]
    fn test_null_parameter_becomes_zero() {
        let options = CalculationOptions::new("");
        let bindings = bag(&[("x", None)]);
        assert_eq!(resolve("x+1", &bindings, &options).unwrap(), "0+1");
    }

    #[test]
    fn test_call_site_is_not_substituted() {
        let options = CalculationOptions::new("");
        let bindings = bag(&[("max", Some("4"))]);
        assert_eq!(
            resolve("max(max, 2)", &bindings, &options).unwrap(),
            "max(4, 2)"
        );
    }

    #[test]
    fn test_all_params_keeps_insertion_order() {
        let options = CalculationOptions::new("");
        let bindings = bag(&[
            ("z", Some("10")),
            ("a", Some("5")),
            ("m", None),
            ("b", Some("7.50")),
        ]);
        assert_eq!(
            resolve("sum(ALL_PARAMS)", &bindings, &options).unwrap(),
            "sum(10,5,0,7.50)"
        );
        assert_eq!(resolve("sum(all_params)", &ParameterBag::new(), &options).unwrap(), "sum()");
    }

    #[test]
    fn test_constants_and_superscripts() {
        let options = CalculationOptions::new("");
        let empty = ParameterBag::new();
        assert_eq!(
            resolve("2 * PI + π", &empty, &options).unwrap(),
            "2 * 3.1415926536 + 3.1415926536"
        );
        assert_eq!(resolve("e", &empty, &options).unwrap(), "2.7182818285");
        assert_eq!(resolve("x² + y³", &empty, &options).unwrap(), "x^2 + y^3");
        let bindings = bag(&[("a", Some("3"))]);
        assert_eq!(resolve("a²", &bindings, &options).unwrap(), "3^2");
        assert_eq!(
            resolve("round(1.55, 1, half_down)", &empty, &options).unwrap(),
            "round(1.55, 1, 2)"
        );
    }

    #[test]
    fn test_parameters_win_over_constants() {
        let options = CalculationOptions::new("");
        let bindings = bag(&[("e", Some("5"))]);
        assert_eq!(resolve("e * PI", &bindings, &options).unwrap(), "5 * 3.1415926536");
    }
}
