/// Renders `value` the way Italian documents print amounts: `.` groups thousands, `,` is the
/// decimal separator.
pub(crate) fn italian(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{sign}{grouped},{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

pub(crate) fn euro(value: f64) -> String {
    format!("{} €", italian(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(italian(10_000.0, 2), "10.000,00");
        assert_eq!(italian(1_234_567.891, 2), "1.234.567,89");
        assert_eq!(italian(500_000.0, 0), "500.000");
        assert_eq!(italian(999.0, 0), "999");
    }

    #[test]
    fn keeps_sign_only_for_visible_negatives() {
        assert_eq!(italian(-1_500.5, 1), "-1.500,5");
        assert_eq!(italian(-0.001, 2), "0,00");
        assert_eq!(euro(20_000.0), "20.000,00 €");
    }
}
