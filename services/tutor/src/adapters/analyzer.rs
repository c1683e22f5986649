//! services/tutor/src/adapters/analyzer.rs
//!
//! This module contains the simulated document-analysis adapter.
//! It implements the `DocumentAnalyzer` port from the `core` crate. No real
//! text extraction happens: the adapter sleeps for a configured delay, then
//! fabricates an analysis with a randomized page count and fixed labels.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;
use tutor_core::domain::DocumentAnalysis;
use tutor_core::ports::{DocumentAnalyzer, PortResult};

/// Chapter labels reported for every analyzed file.
const CHAPTERS: [&str; 4] = [
    "مقدمة",
    "الفصل الأول: المفاهيم الأساسية",
    "الفصل الثاني: تطبيقات عملية",
    "الخاتمة",
];

/// Main-topic labels reported for every analyzed file.
const MAIN_TOPICS: [&str; 3] = [
    "الموضوع الرئيسي أ",
    "الموضوع الرئيسي ب",
    "الموضوع الرئيسي ج",
];

/// Reported page counts fall in `MIN_PAGES..MAX_PAGES`.
const MIN_PAGES: u32 = 50;
const MAX_PAGES: u32 = 250;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentAnalyzer` with a fixed-delay simulation.
#[derive(Clone)]
pub struct MockAnalyzer {
    delay: Duration,
}

impl MockAnalyzer {
    /// Creates a new `MockAnalyzer`. Tests pass `Duration::ZERO`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

//=========================================================================================
// `DocumentAnalyzer` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentAnalyzer for MockAnalyzer {
    async fn analyze(&self, file_name: &str) -> PortResult<DocumentAnalysis> {
        tokio::time::sleep(self.delay).await;

        let page_count = rand::thread_rng().gen_range(MIN_PAGES..MAX_PAGES);
        info!(
            "Simulated analysis of '{}' complete: {} pages",
            file_name, page_count
        );

        Ok(DocumentAnalysis {
            page_count,
            chapters: CHAPTERS.iter().map(|s| s.to_string()).collect(),
            main_topics: MAIN_TOPICS.iter().map(|s| s.to_string()).collect(),
        })
    }
}
