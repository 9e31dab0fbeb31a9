use console::style;

use crate::docs::SearchHit;
use crate::types::{AnalysisResult, Confidence};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    fn confidence(&self, confidence: Confidence) -> String {
        let label = confidence.to_string();
        match confidence {
            Confidence::High => style(label).green().to_string(),
            Confidence::Medium => style(label).yellow().to_string(),
            Confidence::Low => style(label).red().to_string(),
        }
    }

    /// Human-readable rendering of an analysis result
    pub fn analysis(&self, result: &AnalysisResult) {
        self.header(&result.summary);
        println!(
            "Confidence: {}   Model: {}   Time: {} ms",
            self.confidence(result.confidence),
            result.model_used,
            result.processing_time_ms
        );
        if let Some(error) = &result.error {
            self.error(error);
        }

        self.section("Suggested cause");
        println!("{}", result.suggested_cause);

        self.section("Suggested solutions");
        for (i, solution) in result.suggested_solutions.iter().enumerate() {
            println!(
                "{}. {} [{:?}, {}]",
                i + 1,
                style(&solution.title).bold(),
                solution.estimated_effort,
                self.confidence(solution.confidence)
            );
            if !solution.description.is_empty() {
                println!("   {}", solution.description);
            }
            for step in &solution.steps {
                println!("   - {}", step);
            }
        }

        if let Some(screenshot) = &result.screenshot_analysis {
            self.section("Screenshot");
            println!("{}", screenshot.description);
            for error in &screenshot.visible_errors {
                self.warning(error);
            }
        }

        if let Some(video) = &result.video_analysis {
            self.section("Recording");
            println!("{}", video.description);
            for moment in &video.error_moments {
                println!("   {:>6.1}s  {}", moment.seconds, moment.description);
            }
        }

        if let Some(docs) = &result.related_docs {
            self.section("Related documentation");
            for doc in docs {
                println!(
                    "• {} › {}  {}",
                    doc.section_title,
                    doc.article_title,
                    style(&doc.relevance).dim()
                );
            }
        }
    }

    /// Ranked search hits
    pub fn hits(&self, hits: &[SearchHit]) {
        if hits.is_empty() {
            self.info("No matching articles");
            return;
        }
        for hit in hits {
            println!(
                "{:>3}  {} › {}  {}",
                hit.relevance,
                hit.section_title,
                style(&hit.article_title).bold(),
                style(format!("({}/{})", hit.section_id, hit.article_id)).dim()
            );
            println!("     {}", hit.excerpt);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
