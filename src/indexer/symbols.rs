use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::graph::ModuleGraph;
use super::{Symbol, SymbolKind};
use crate::vfs::normalize_path;

/// A symbol as seen from an importing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedSymbol {
    pub namespace: Option<String>,
    pub symbol: Symbol,
}

impl ModuleGraph<'_> {
    /// Public members of `file` followed by those of every file it forwards,
    /// transitively. `visited` stops forwarding cycles.
    pub fn exported_symbols(&self, file: &Path, visited: &mut HashSet<PathBuf>, out: &mut Vec<Symbol>) {
        let file = normalize_path(file);
        if !visited.insert(file.clone()) {
            return;
        }

        out.extend(self.symbols(&file).iter().filter(|s| !s.is_private()).cloned());

        for target in self.forwards(&file).iter() {
            self.exported_symbols(target, visited, out);
        }
    }

    /// Everything visible from `file`: its own declarations (unscoped) and,
    /// for each import edge in order, the exports reachable through it under
    /// the edge's namespace.
    pub fn reachable_symbols(&self, file: &Path) -> Vec<ScopedSymbol> {
        let file = normalize_path(file);
        let mut reachable: Vec<ScopedSymbol> = self
            .symbols(&file)
            .iter()
            .map(|symbol| ScopedSymbol {
                namespace: None,
                symbol: symbol.clone(),
            })
            .collect();

        for edge in self.imports(&file).iter() {
            let mut visited = HashSet::from([file.clone()]);
            let mut exported = Vec::new();
            self.exported_symbols(&edge.target, &mut visited, &mut exported);
            reachable.extend(exported.into_iter().map(|symbol| ScopedSymbol {
                namespace: edge.namespace.clone(),
                symbol,
            }));
        }

        reachable
    }
}

/// Keep the first symbol for each `(namespace, name, kind)`.
pub fn dedupe_scoped(symbols: Vec<ScopedSymbol>) -> Vec<ScopedSymbol> {
    let mut seen: HashSet<(Option<String>, String, SymbolKind)> = HashSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert((s.namespace.clone(), s.symbol.name.clone(), s.symbol.kind)))
        .collect()
}
