use crate::error::Result;
use chrono::Local;
use maud::{html, Markup, PreEscaped};
use plotly::Plot;
use std::fs;
use std::path::Path;

/// One titled block of the report
pub struct ReportSection {
    title: String,
    content_blocks: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content_blocks: Vec::new(),
        }
    }

    /// Add a paragraph of text
    pub fn add_text(&mut self, text: &str) {
        self.content_blocks.push(html! { p { (text) } });
    }

    /// Add an interactive chart
    pub fn add_plot(&mut self, plot: &Plot) {
        self.content_blocks.push(html! {
            div style="width: 900px; height: 520px;" {
                (PreEscaped(plot.to_inline_html(None)))
            }
        });
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content_blocks {
                    (block)
                }
            }
        }
    }
}

/// Single-page HTML report assembling the reporting charts
pub struct PriceReport {
    title: String,
    sections: Vec<ReportSection>,
}

impl PriceReport {
    pub fn new(title: &str) -> Self {
        PriceReport {
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    fn render(&self) -> Markup {
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        html! {
            html {
                head {
                    title { (self.title) }
                    script src="https://cdn.plot.ly/plotly-latest.min.js" {}
                    style {
                        (PreEscaped("
                            body {
                                font-family: Arial, sans-serif;
                                margin: 0 auto;
                                max-width: 960px;
                                padding: 0 20px;
                            }
                            .banner {
                                padding: 15px;
                                background: linear-gradient(135deg, #4a90e2, #145da0);
                                border-radius: 12px;
                                color: white;
                                margin: 20px 0;
                            }
                            .banner h1 {
                                margin: 0;
                                font-size: 32px;
                            }
                            .banner p {
                                margin: 4px 0 0;
                                opacity: 0.8;
                            }
                            section {
                                margin-bottom: 40px;
                            }
                        "))
                    }
                }

                body {
                    div class="banner" {
                        h1 { (self.title) }
                        p {
                            "fare_reporting v" (env!("CARGO_PKG_VERSION"))
                            ", generated " (generated_at)
                        }
                    }

                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        }
    }

    /// Save the report to an HTML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render().into_string())?;
        Ok(())
    }
}
