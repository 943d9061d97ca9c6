//! Writer lookup by name and the orchestrator running a writer list

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use indexmap::IndexMap;
use log::debug;
use ufo2ot_core::{FontSource, UnicodeProperties};

use crate::{
    CursiveFeatureWriter, Error, GdefFeatureWriter, KernFeatureWriter, MarkFeatureWriter, Result,
    ast::FeatureFile,
    writer::{FeatureWriter, GSUB, WriterContext},
};

/// The built-in writers
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriterKind {
    Kern,
    Mark,
    Cursive,
    Gdef,
}

impl WriterKind {
    pub const ALL: [WriterKind; 4] = [WriterKind::Kern, WriterKind::Mark, WriterKind::Cursive, WriterKind::Gdef];

    pub fn name(self) -> &'static str {
        match self {
            WriterKind::Kern => "KernFeatureWriter",
            WriterKind::Mark => "MarkFeatureWriter",
            WriterKind::Cursive => "CursFeatureWriter",
            WriterKind::Gdef => "GdefFeatureWriter",
        }
    }

    /// A writer with default options
    pub fn build(self) -> Box<dyn FeatureWriter> {
        match self {
            WriterKind::Kern => Box::new(KernFeatureWriter::default()),
            WriterKind::Mark => Box::new(MarkFeatureWriter::default()),
            WriterKind::Cursive => Box::new(CursiveFeatureWriter::default()),
            WriterKind::Gdef => Box::new(GdefFeatureWriter::default()),
        }
    }
}

impl Display for WriterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WriterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "KernFeatureWriter" | "kern" => Ok(WriterKind::Kern),
            "MarkFeatureWriter" | "mark" => Ok(WriterKind::Mark),
            "CursFeatureWriter" | "curs" => Ok(WriterKind::Cursive),
            "GdefFeatureWriter" | "gdef" => Ok(WriterKind::Gdef),
            other => Err(Error::UnknownWriter(other.to_string())),
        }
    }
}

/// The default writer list
pub fn default_writers() -> Vec<Box<dyn FeatureWriter>> {
    WriterKind::ALL.into_iter().map(WriterKind::build).collect()
}

pub type WriterFactory = Box<dyn Fn() -> Box<dyn FeatureWriter> + Send + Sync>;

/// Writer constructors by name; starts with the built-in writers
pub struct WriterRegistry {
    factories: IndexMap<String, WriterFactory>,
}

impl Default for WriterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: IndexMap::new(),
        };
        for kind in WriterKind::ALL {
            registry.register(kind.name(), move || kind.build());
        }
        registry
    }

    /// Add a writer, replacing any registered under the same name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn FeatureWriter> + Send + Sync + 'static,
    ) -> &mut Self {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn FeatureWriter>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownWriter(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

/// Whether a writer added anything to the feature file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOutcome {
    pub name: String,
    pub wrote: bool,
}

/// Run `writers` against one font, GSUB writers first
///
/// GPOS writers classify glyphs through the substitutions in `fea`, so they
/// must see everything the GSUB writers add. Otherwise writers run in the
/// order given.
pub fn write_features(
    source: &dyn FontSource,
    unicode: &dyn UnicodeProperties,
    fea: &mut FeatureFile,
    writers: &[Box<dyn FeatureWriter>],
) -> Result<Vec<WriterOutcome>> {
    let ctx = WriterContext::new(source, unicode)?;

    let mut ordered: Vec<&dyn FeatureWriter> = writers.iter().map(|writer| writer.as_ref()).collect();
    ordered.sort_by_key(|writer| writer.table() != GSUB);

    let mut outcomes = Vec::with_capacity(ordered.len());
    for writer in ordered {
        let wrote = writer.write(&ctx, fea)?;
        debug!("{}: {}", writer.name(), if wrote { "wrote features" } else { "nothing written" });
        outcomes.push(WriterOutcome {
            name: writer.name().to_string(),
            wrote,
        });
    }
    Ok(outcomes)
}
