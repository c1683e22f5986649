pub mod domain;
pub mod ports;

pub use domain::{
    ChatSession, Creativity, DocumentAnalysis, Message, PdfFile, Sender, TopicCount, UserStats,
};
pub use ports::{DocumentAnalyzer, PortError, PortResult, ResponseGenerator};
