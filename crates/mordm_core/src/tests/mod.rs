//! Cross-module scenario tests
//!
//! Tests are organized by topic:
//! - `properties` - Guarantees every problem, design and score must uphold
//! - `methods` - Each registered sensitivity method run end to end
//! - `workflow` - Sample, optimize and check robustness on one problem

mod workflow;
