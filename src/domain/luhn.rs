/// Check a digit string against the Luhn checksum.
///
/// Surrounding whitespace is ignored. Empty input and any non-digit
/// character fail the check.
pub fn is_valid(number: &str) -> bool {
    let digits = number.trim().as_bytes();
    if digits.is_empty() {
        return false;
    }

    let parity = digits.len() % 2;
    let mut sum = 0u32;

    for (i, byte) in digits.iter().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let mut digit = u32::from(byte - b'0');
        if i % 2 == parity {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }

    sum % 10 == 0
}
