/// Price with thousands separators: $1,234.56
pub fn price(val: f64) -> String {
    let total = cents(val.abs());
    let digits = (total / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if val < 0.0 && total > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", total % 100)
}

/// Bar label in the style of the chart data labels: 549.00$
pub fn price_label(val: f64) -> String {
    format!("{val:.2}$")
}

/// One decimal, as shown in the pie tooltip: 42.5%
pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}

pub fn product_count(count: usize) -> String {
    if count == 1 {
        "1 product".to_string()
    } else {
        format!("{count} products")
    }
}

/// Bar heights are integers, so prices go in as cents.
pub fn cents(val: f64) -> u64 {
    (val.max(0.0) * 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_formatting() {
        assert_eq!(price(1234.56), "$1,234.56");
        assert_eq!(price(-500.00), "-$500.00");
        assert_eq!(price(0.0), "$0.00");
        assert_eq!(price(1000000.99), "$1,000,000.99");
        assert_eq!(price(9.99), "$9.99");
        assert_eq!(price(999.999), "$1,000.00");
        assert_eq!(price(-0.001), "$0.00");
    }

    #[test]
    fn test_price_label_and_percent() {
        assert_eq!(price_label(549.0), "549.00$");
        assert_eq!(price_label(12.5), "12.50$");
        assert_eq!(percent(42.456), "42.5%");
        assert_eq!(percent(0.0), "0.0%");
    }

    #[test]
    fn test_product_count() {
        assert_eq!(product_count(0), "0 products");
        assert_eq!(product_count(1), "1 product");
        assert_eq!(product_count(5), "5 products");
    }

    #[test]
    fn test_cents() {
        assert_eq!(cents(549.0), 54900);
        assert_eq!(cents(9.99), 999);
        assert_eq!(cents(-3.0), 0);
    }
}
