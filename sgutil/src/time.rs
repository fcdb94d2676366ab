use std::time::Instant;

use crate::prettyprint_usize;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct Span {
    name: String,
    started_at: Instant,
}

struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
}

impl Progress {
    // Returns a summary line when done
    fn next(&mut self) -> Option<String> {
        self.processed_items += 1;
        if self.processed_items > self.total_items {
            panic!(
                "{} is too few items for {} progress",
                prettyprint_usize(self.total_items),
                self.label
            );
        }
        if self.processed_items == self.total_items {
            Some(format!(
                "{} ({})... {}",
                self.label,
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed_seconds(self.started_at))
            ))
        } else {
            None
        }
    }
}

/// Hierarchical timing of the stages of a batch run, printed as they complete. Warnings are
/// collected and repeated at the end, where they won't scroll away.
pub struct Timer {
    outermost_name: String,
    started_at: Instant,
    stack: Vec<Span>,
    progress: Option<Progress>,
    notes: Vec<String>,
    warnings: Vec<String>,
}

impl Timer {
    pub fn new<S: Into<String>>(name: S) -> Timer {
        let name = name.into();
        println!("{}...", name);
        Timer {
            outermost_name: name,
            started_at: Instant::now(),
            stack: Vec::new(),
            progress: None,
            notes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// For contexts where nobody's watching the output.
    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    pub fn start<S: Into<String>>(&mut self, name: S) {
        self.stack.push(Span {
            name: name.into(),
            started_at: Instant::now(),
        });
    }

    pub fn stop<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        let span = self
            .stack
            .pop()
            .unwrap_or_else(|| panic!("stop(\"{}\") called with nothing started", name));
        if span.name != name {
            panic!("stop(\"{}\") doesn't match start(\"{}\")", name, span.name);
        }
        println!(
            "{}- {}... {}",
            self.indent(),
            span.name,
            prettyprint_time(elapsed_seconds(span.started_at))
        );
    }

    /// Then call `next()` for every item.
    pub fn start_iter<S: Into<String>>(&mut self, label: S, total_items: usize) {
        if self.progress.is_some() {
            panic!("Can't start_iter while another iteration is in progress");
        }
        if total_items == 0 {
            return;
        }
        self.progress = Some(Progress {
            label: label.into(),
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
        });
    }

    pub fn next(&mut self) {
        let progress = self
            .progress
            .as_mut()
            .expect("next() called outside of start_iter()");
        if let Some(line) = progress.next() {
            println!("{}- {}", self.indent(), line);
            self.progress = None;
        }
    }

    pub fn note(&mut self, line: String) {
        self.notes.push(line);
    }

    pub fn warn(&mut self, line: String) {
        self.warnings.push(line);
    }

    pub fn done(self) {
        if let Some(span) = self.stack.last() {
            panic!("done() before stop(\"{}\")", span.name);
        }
        println!(
            "{}... total {}",
            self.outermost_name,
            prettyprint_time(elapsed_seconds(self.started_at))
        );
        for line in self.notes {
            println!("  - {}", line);
        }
        if !self.warnings.is_empty() {
            println!("{} warnings:", prettyprint_usize(self.warnings.len()));
            for line in self.warnings {
                println!("  - {}", line);
            }
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.stack.len() + 1)
    }
}
