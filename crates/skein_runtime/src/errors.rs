//! Common error message constants used throughout the runtime.

pub mod messages {
    pub const STACK_OVERFLOW: &str = "Maximum call stack size exceeded";
    pub const CONST_ASSIGNMENT: &str = "Assignment to constant variable.";
    pub const TO_PRIMITIVE: &str = "Cannot convert object to primitive value";
    pub const INSTANCEOF_NOT_CALLABLE: &str = "Right-hand side of 'instanceof' is not callable";
    pub const NOT_A_CONSTRUCTOR: &str = "is not a constructor";
    pub const NOT_A_FUNCTION: &str = "is not a function";
}
