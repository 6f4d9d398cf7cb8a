use log::debug;
use std::io::{BufRead, Write};

use form_engine::*;

/// Asks the questions of the form on a terminal.
///
/// Empty answers select the default. Answers that cannot be understood are
/// asked again.
pub struct TerminalProvider<R: BufRead, W: Write> {
    input: R,
    output: W,
}

fn provider_error(e: std::io::Error) -> FormErrors {
    FormErrors::Provider(e.to_string())
}

impl<R: BufRead, W: Write> TerminalProvider<R, W> {
    pub fn new(input: R, output: W) -> TerminalProvider<R, W> {
        TerminalProvider { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    // Returns the trimmed answer, or an error once the input is closed.
    fn ask(&mut self, prompt: &str) -> Result<String, FormErrors> {
        write!(self.output, "{}", prompt).map_err(provider_error)?;
        self.output.flush().map_err(provider_error)?;
        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(provider_error)?;
        if n == 0 {
            return Err(FormErrors::Provider(format!(
                "input closed while asking {:?}",
                prompt.trim()
            )));
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, msg: &str) -> Result<(), FormErrors> {
        writeln!(self.output, "{}", msg).map_err(provider_error)
    }

    fn ask_radio(&mut self, request: &WidgetRequest) -> Result<Value, FormErrors> {
        let options = request.options();
        self.say(&request.label)?;
        for (idx, v) in options.iter().enumerate() {
            let marker = if *v == request.default { "*" } else { " " };
            let line = format!("  {}{}) {}", marker, idx + 1, request.format.format_value(v));
            self.say(&line)?;
        }
        loop {
            let answer = self.ask(&format!("Choice [1-{}]: ", options.len()))?;
            if answer.is_empty() {
                return Ok(request.default.clone());
            }
            match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= options.len() => return Ok(options[n - 1].clone()),
                _ => self.say("Please enter the number of one of the choices.")?,
            }
        }
    }

    fn ask_number(&mut self, request: &WidgetRequest) -> Result<Value, FormErrors> {
        let fmt = &request.format;
        let prompt = format!(
            "{} [{} .. {}, step {}] (default {}): ",
            request.label,
            fmt.format_value(&request.min),
            fmt.format_value(&request.max),
            fmt.format_value(&request.step),
            fmt.format_value(&request.default)
        );
        loop {
            let answer = self.ask(&prompt)?;
            if answer.is_empty() {
                return Ok(request.default.clone());
            }
            let parsed = match request.format.coercion() {
                Coercion::Int => answer.parse::<i64>().ok().map(Value::Int),
                Coercion::Float => answer.parse::<f64>().ok().map(Value::Float),
                Coercion::Text => Some(Value::Text(answer.clone())),
            };
            match parsed {
                Some(v) => return Ok(v),
                None => self.say(&format!("Cannot read {:?} as a {}.", answer, fmt.as_str()))?,
            }
        }
    }
}

impl<R: BufRead, W: Write> WidgetProvider for TerminalProvider<R, W> {
    fn get_checkbox(&mut self, label: &str, default: bool) -> Result<bool, FormErrors> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{} [{}] ", label, hint))?;
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" | "true" | "1" => return Ok(true),
                "n" | "no" | "false" | "0" => return Ok(false),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }

    fn get_value(&mut self, request: &WidgetRequest) -> Result<Value, FormErrors> {
        debug!(
            "TerminalProvider: asking {} {:?}",
            request.kind.name(),
            request.key
        );
        match request.kind {
            WidgetKind::Radio => self.ask_radio(request),
            WidgetKind::Slider | WidgetKind::NumberInput => self.ask_number(request),
        }
    }

    fn show_header(&mut self, label: &str) {
        // The header is decoration only, a failed write shows up at the next prompt.
        let _ = writeln!(self.output, "\n== {} ==", label);
    }
}
