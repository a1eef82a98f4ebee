//! Registry of optional extraction backends.
//!
//! Availability is resolved once, stored process-wide and never re-checked.
//! Compiled-in backends are available unless the config disables them; the
//! OCR engine is an external executable and is probed on the `PATH`.

use crate::config::Config;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::process::Command;
use tracing::{debug, info, warn};

static REGISTRY: OnceCell<Capabilities> = OnceCell::new();

/// A named optional backend gating one or more extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Pdf,
    Docx,
    Rtf,
    /// HTML and XML tag stripping
    Markup,
    /// Well-formed parser tried before the permissive markup fallback
    StrictMarkup,
    Odt,
    Ocr,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Pdf,
        Capability::Docx,
        Capability::Rtf,
        Capability::Markup,
        Capability::StrictMarkup,
        Capability::Odt,
        Capability::Ocr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::Pdf => "pdf",
            Capability::Docx => "docx",
            Capability::Rtf => "rtf",
            Capability::Markup => "markup",
            Capability::StrictMarkup => "strict-markup",
            Capability::Odt => "odt",
            Capability::Ocr => "ocr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cap| cap.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved availability of every backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub pdf: bool,
    pub docx: bool,
    pub rtf: bool,
    pub markup: bool,
    pub strict_markup: bool,
    pub odt: bool,
    pub ocr: bool,
}

impl Capabilities {
    /// Every backend available
    pub fn all() -> Self {
        Self {
            pdf: true,
            docx: true,
            rtf: true,
            markup: true,
            strict_markup: true,
            odt: true,
            ocr: true,
        }
    }

    /// No backend available
    pub fn none() -> Self {
        Self::default()
    }

    /// Copy with one backend switched on or off
    pub fn with(mut self, capability: Capability, available: bool) -> Self {
        *self.slot(capability) = available;
        self
    }

    /// Probe every backend, honoring the config's disabled list
    pub fn probe(config: &Config) -> Self {
        for name in &config.backends.disabled {
            if Capability::from_name(name).is_none() {
                warn!("Unknown backend in disabled list: {}", name);
            }
        }

        let mut caps = Self::none();
        for capability in Capability::ALL {
            let available = if config.backends.is_disabled(capability.name()) {
                debug!("Backend {} disabled by config", capability);
                false
            } else if capability == Capability::Ocr {
                Self::check_command(&config.ocr.command)
            } else {
                true
            };
            *caps.slot(capability) = available;
        }
        caps
    }

    /// Resolve the process-wide registry. The first call probes; every later
    /// call returns that same result whatever config it is given.
    pub fn resolve(config: &Config) -> &'static Capabilities {
        REGISTRY.get_or_init(|| {
            let caps = Self::probe(config);
            info!(
                "Capabilities resolved: {}",
                caps.available().map(Capability::name).collect::<Vec<_>>().join(", ")
            );
            caps
        })
    }

    /// Whether a backend is available. Never re-probes.
    pub fn ensure(&self, capability: Capability) -> bool {
        match capability {
            Capability::Pdf => self.pdf,
            Capability::Docx => self.docx,
            Capability::Rtf => self.rtf,
            Capability::Markup => self.markup,
            Capability::StrictMarkup => self.strict_markup,
            Capability::Odt => self.odt,
            Capability::Ocr => self.ocr,
        }
    }

    /// Available backends in declaration order
    pub fn available(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|cap| self.ensure(*cap))
    }

    fn slot(&mut self, capability: Capability) -> &mut bool {
        match capability {
            Capability::Pdf => &mut self.pdf,
            Capability::Docx => &mut self.docx,
            Capability::Rtf => &mut self.rtf,
            Capability::Markup => &mut self.markup,
            Capability::StrictMarkup => &mut self.strict_markup,
            Capability::Odt => &mut self.odt,
            Capability::Ocr => &mut self.ocr,
        }
    }

    /// Check if an executable answers `--version`
    fn check_command(cmd: &str) -> bool {
        Command::new(cmd)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}
