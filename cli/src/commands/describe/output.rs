//! Output formatting for describe command results.

use super::execute::DescribeResult;
use crate::output::Outputable;

impl Outputable for DescribeResult {
    fn to_table(&self) -> String {
        if self.nodes.is_empty() {
            return "No types defined.\n".to_string();
        }
        self.text.clone()
    }
}
