//! Output formatting for generate command results.

use super::execute::GenerateResult;
use crate::output::Outputable;

impl Outputable for GenerateResult {
    fn to_table(&self) -> String {
        if self.files.is_empty() {
            return format!("Nothing generated in {}\n", self.target.display());
        }
        let mut out = format!("Generated {} file(s) in {}:\n", self.files.len(), self.target.display());
        for file in &self.files {
            out.push_str(&format!("  {}\n", file.display()));
        }
        out
    }
}
