pub mod analyzer;
pub mod responder;

pub use analyzer::MockAnalyzer;
pub use responder::MockResponder;
