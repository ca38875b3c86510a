/// Stable error codes reported by the CLI and written to machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    GeneralError = 1,
    ParseError = 2,
    ValidationError = 3,
    ConfigError = 4,
    TaskNotFound = 10,
    DependencyError = 11,
    CircularDependency = 12,
    DependencyFormat = 13,
    WaveError = 14,
    QualityControlError = 20,
    FileNotFound = 60,
    FileAccessDenied = 61,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::Success.as_u16(), 0);
        assert_eq!(ErrorCode::DependencyError.as_u16(), 11);
        assert_eq!(ErrorCode::CircularDependency.as_u16(), 12);
        assert_eq!(ErrorCode::DependencyFormat.as_u16(), 13);
    }
}
