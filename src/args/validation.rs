use std::fs;
use std::path::PathBuf;

/// # Errors
///
/// Will return `Err` if the file is not readable
pub fn check_readable_file(file: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(file);
    if !path.is_file() || fs::metadata(&path).is_err() {
        return Err(format!("The file '{file}' is not readable."));
    }
    Ok(path)
}

/// # Errors
///
/// Will return `Err` unless `value` is a whole number above zero
pub fn check_positive(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("value must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("'{value}' is not a count: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_counts_only() {
        assert_eq!(check_positive("250"), Ok(250));
        assert!(check_positive("0").is_err());
        assert!(check_positive("-1").is_err());
    }

    #[test]
    fn missing_file_is_rejected() {
        assert!(check_readable_file("/definitely/not/here.toml").is_err());
    }
}
