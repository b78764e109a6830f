use std::path::{Path, PathBuf};

use super::{AggregateSourceLocator, SingleFileSourceLocator, SourceLocator};
use crate::ast::AstLocator;
use crate::error::{Error, Result};
use crate::identifier::{Identifier, IdentifierType};
use crate::reflection::Reflection;
use crate::reflector::Reflector;

/// Every `.php` file below a set of directories, searched file by file in
/// sorted path order.
pub struct DirectoriesSourceLocator {
    files: Vec<PathBuf>,
    aggregate: AggregateSourceLocator,
}

impl DirectoriesSourceLocator {
    /// Fails with [`Error::InvalidDirectory`] if any entry is not a
    /// directory.
    pub fn new<P: AsRef<Path>>(directories: &[P], ast_locator: AstLocator) -> Result<Self> {
        let mut files = Vec::new();
        for directory in directories {
            let directory = directory.as_ref();
            if !directory.is_dir() {
                return Err(Error::InvalidDirectory {
                    path: directory.to_path_buf(),
                    reason: "not a directory".to_string(),
                });
            }
            files.extend(php_files_in(directory)?);
        }

        let locators = files
            .iter()
            .map(|file| {
                SingleFileSourceLocator::new(file.clone(), ast_locator.clone())
                    .map(|locator| Box::new(locator) as Box<dyn SourceLocator>)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("{} PHP files under {} directories", files.len(), directories.len());
        Ok(DirectoriesSourceLocator {
            files,
            aggregate: AggregateSourceLocator::new(locators),
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn php_files_in(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in ignore::WalkBuilder::new(directory)
        .standard_filters(false)
        .follow_links(false)
        .build()
    {
        let entry = entry.map_err(|e| Error::InvalidDirectory {
            path: directory.to_path_buf(),
            reason: e.to_string(),
        })?;
        let is_file = entry.file_type().is_some_and(|kind| kind.is_file());
        if is_file && entry.path().extension().is_some_and(|ext| ext == "php") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

impl SourceLocator for DirectoriesSourceLocator {
    fn locate_identifier(
        &self,
        reflector: &dyn Reflector,
        identifier: &Identifier,
    ) -> Result<Option<Reflection>> {
        self.aggregate.locate_identifier(reflector, identifier)
    }

    fn locate_identifiers_by_type(
        &self,
        reflector: &dyn Reflector,
        identifier_type: IdentifierType,
    ) -> Result<Vec<Reflection>> {
        self.aggregate
            .locate_identifiers_by_type(reflector, identifier_type)
    }
}
