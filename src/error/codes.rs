/// Error code registry for regform
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Expression errors
/// - 3000-3999: Transform errors
/// - 4000-4999: Bundle path errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_INVALID_JSON: u16 = 1003;
    pub const CONFIG_INVALID_TOML: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_UNKNOWN_OPERATION: u16 = 1006;
    pub const CONFIG_UNKNOWN_SECTION: u16 = 1007;
    pub const CONFIG_VALIDATION_FAILED: u16 = 1008;
    pub const CONFIG_INVALID_PARAMETER: u16 = 1009;

    // Expression errors (2000-2999)
    pub const EXPR_GENERIC: u16 = 2000;
    pub const EXPR_SYNTAX: u16 = 2001;
    pub const EXPR_UNKNOWN_HELPER: u16 = 2002;
    pub const EXPR_TOO_DEEP: u16 = 2003;

    // Transform errors (3000-3999)
    pub const TRANSFORM_GENERIC: u16 = 3000;
    pub const TRANSFORM_MISMATCH: u16 = 3001;
    pub const TRANSFORM_MISSING_DATA: u16 = 3002;
    pub const TRANSFORM_NO_QUERY: u16 = 3003;
    pub const TRANSFORM_RECURSION_LIMIT: u16 = 3004;

    // Bundle path errors (4000-4999)
    pub const PATH_GENERIC: u16 = 4000;
    pub const PATH_EMPTY_SEGMENT: u16 = 4001;
    pub const PATH_INVALID_INDEX: u16 = 4002;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_IO: u16 = 9001;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Definition or configuration file not found",
        1002 => "Invalid YAML syntax",
        1003 => "Invalid JSON syntax",
        1004 => "Invalid TOML syntax",
        1005 => "Invalid value in configuration",
        1006 => "Field references an unregistered operation",
        1007 => "Unknown section",
        1008 => "Form definition validation failed",
        1009 => "Invalid operation parameter",

        2000 => "Generic expression error",
        2001 => "Malformed conditional expression",
        2002 => "Unknown helper predicate",
        2003 => "Expression nested too deeply",

        3000 => "Generic transform error",
        3001 => "Transform produced a value of the wrong shape",
        3002 => "Expected data missing from bundle",
        3003 => "Operation has no query direction",
        3004 => "Cross-section recursion limit reached",

        4000 => "Generic bundle path error",
        4001 => "Empty path segment",
        4002 => "Invalid array index in path",

        9000 => "Generic error",
        9001 => "I/O error",

        _ => "Unknown error code",
    }
}
