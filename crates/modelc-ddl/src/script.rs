//! Script writers
//!
//! Every script starts with a banner naming the application, the script and
//! its purpose. Statements are followed by the batch separator of the dialect.

use modelc_core::OutputConfig;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes statements of one script
pub struct ScriptWriter<W: Write> {
    out: W,
    separator: &'static str,
    statements: usize,
}

impl<W: Write> ScriptWriter<W> {
    /// Create a writer and emit the banner
    pub fn new(
        mut out: W,
        application: &str,
        script_name: &str,
        description: &str,
        separator: &'static str,
    ) -> std::io::Result<Self> {
        writeln!(out, "-- =========================================================================================== ")?;
        writeln!(out, "--   Application Name : {}", application)?;
        writeln!(out, "--   Script Name : {}", script_name)?;
        writeln!(out, "--   Description : {}", description)?;
        writeln!(out, "-- =========================================================================================== ")?;
        writeln!(out)?;

        Ok(Self {
            out,
            separator,
            statements: 0,
        })
    }

    /// Write one statement and its batch separator
    pub fn statement(&mut self, sql: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", sql)?;
        writeln!(self.out, "{}", self.separator)?;
        writeln!(self.out)?;
        self.statements += 1;
        Ok(())
    }

    /// Write a comment line
    pub fn comment(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "-- {}", text)
    }

    /// Number of statements written
    pub fn statement_count(&self) -> usize {
        self.statements
    }

    /// Flush buffered output
    pub fn finish(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }
}

/// Scripts written by the schema generator
pub struct SchemaScripts<W: Write> {
    pub create: ScriptWriter<W>,
    pub unique_keys: ScriptWriter<W>,
    pub indexes: ScriptWriter<W>,
    pub types: ScriptWriter<W>,
}

/// Scripts written by the initializer generator
pub struct InitScripts<W: Write> {
    pub data: ScriptWriter<W>,
    pub translations: ScriptWriter<W>,
}

/// The six scripts of one generation run
pub struct ScriptSet<W: Write> {
    pub schema: SchemaScripts<W>,
    pub init: InitScripts<W>,
}

impl<W: Write> ScriptSet<W> {
    /// Flush every script
    pub fn finish(&mut self) -> std::io::Result<()> {
        self.schema.create.finish()?;
        self.schema.unique_keys.finish()?;
        self.schema.indexes.finish()?;
        self.schema.types.finish()?;
        self.init.data.finish()?;
        self.init.translations.finish()
    }
}

impl ScriptSet<BufWriter<File>> {
    /// Create the scripts in `directory`
    ///
    /// Files are closed when the set is dropped, whether generation
    /// succeeded or not.
    pub fn create_in(
        directory: &Path,
        output: &OutputConfig,
        application: &str,
        separator: &'static str,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(directory)?;

        let open = |name: &str, description: &str| -> std::io::Result<ScriptWriter<BufWriter<File>>> {
            let file = File::create(directory.join(name))?;
            ScriptWriter::new(BufWriter::new(file), application, name, description, separator)
        };

        Ok(Self {
            schema: SchemaScripts {
                create: open(&output.create_script, "Tables creation")?,
                unique_keys: open(&output.unique_key_script, "Unique keys creation")?,
                indexes: open(&output.index_script, "Indexes and foreign keys creation")?,
                types: open(&output.type_script, "Types creation")?,
            },
            init: InitScripts {
                data: open(&output.init_script, "Static and reference lists content")?,
                translations: open(&output.translation_script, "Reference lists translations")?,
            },
        })
    }
}

impl ScriptSet<Vec<u8>> {
    /// In-memory scripts
    pub fn in_memory(application: &str, separator: &'static str) -> std::io::Result<Self> {
        let open = |name: &str| ScriptWriter::new(Vec::new(), application, name, name, separator);

        Ok(Self {
            schema: SchemaScripts {
                create: open("create")?,
                unique_keys: open("unique_keys")?,
                indexes: open("indexes")?,
                types: open("types")?,
            },
            init: InitScripts {
                data: open("data")?,
                translations: open("translations")?,
            },
        })
    }
}

impl ScriptWriter<Vec<u8>> {
    /// Content written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_and_separator() {
        let mut writer = ScriptWriter::new(Vec::new(), "Shop", "01_tables.sql", "Tables creation", "go").unwrap();
        writer.comment("Order (ORDERS)").unwrap();
        writer.statement("create table [T] ([ID] int)").unwrap();

        let text = writer.contents();
        assert!(text.contains("\n-- Order (ORDERS)\ncreate table [T]"));
        assert!(text.contains("--   Application Name : Shop"));
        assert!(text.contains("--   Script Name : 01_tables.sql"));
        assert!(text.ends_with("create table [T] ([ID] int)\ngo\n\n"));
        assert_eq!(writer.statement_count(), 1);
    }

    #[test]
    fn files_are_created_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig::default();

        {
            let mut scripts = ScriptSet::create_in(dir.path(), &output, "Shop", "/").unwrap();
            scripts.schema.create.statement("create table T (ID NUMBER(10))").unwrap();
            scripts.finish().unwrap();
        }

        let content = std::fs::read_to_string(dir.path().join(&output.create_script)).unwrap();
        assert!(content.contains("create table T (ID NUMBER(10))\n/\n"));
        assert!(dir.path().join(&output.translation_script).exists());
    }
}
