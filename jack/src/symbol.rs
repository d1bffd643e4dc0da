//! Scoped symbol tables.
use std::fmt;

use smol_str::SmolStr;

use crate::{constants::TABLE_SIZE, vm::Segment};

/// Declared name in a class or subroutine scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Declared type, either a primitive keyword or a class name.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    /// Slot within the kind's segment.
    pub index: u16,
}

/// Storage class of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    const COUNT: usize = 4;

    /// Segment the kind is stored in.
    #[inline]
    pub fn segment(&self) -> Segment {
        match self {
            Self::Static => Segment::Static,
            Self::Field => Segment::This,
            Self::Argument => Segment::Argument,
            Self::Local => Segment::Local,
        }
    }
}

impl fmt::Display for SymbolKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static   => write!(f, "static"),
            Self::Field    => write!(f, "field"),
            Self::Argument => write!(f, "argument"),
            Self::Local    => write!(f, "var"),
        }
    }
}

impl Symbol {
    #[inline]
    pub fn segment(&self) -> Segment {
        self.kind.segment()
    }
}

/// Hash bucketed table of symbols declared in one scope.
///
/// Each kind has its own counter, so indices are unique per kind.
/// Symbols within a bucket keep their declaration order.
#[derive(Debug)]
pub struct SymbolTable {
    buckets: Box<[Vec<Symbol>]>,
    counts: [u16; SymbolKind::COUNT],
}

/// Returned when a name is declared twice in the same table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSymbol {
    pub name: SmolStr,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); TABLE_SIZE].into_boxed_slice(),
            counts: [0; SymbolKind::COUNT],
        }
    }

    /// Declare a name, assigning it the next free index of its kind.
    ///
    /// Returns the assigned index.
    pub fn insert(
        &mut self,
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        kind: SymbolKind,
    ) -> Result<u16, DuplicateSymbol> {
        let name = name.into();
        if self.lookup(&name).is_some() {
            return Err(DuplicateSymbol { name });
        }

        let index = self.counts[kind as usize];
        self.counts[kind as usize] += 1;

        self.buckets[hash_name(&name)].push(Symbol {
            name,
            ty: ty.into(),
            kind,
            index,
        });

        Ok(index)
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.buckets[hash_name(name)]
            .iter()
            .find(|symbol| symbol.name == name)
    }

    /// Number of indices handed out for the given kind.
    #[inline]
    pub fn kind_count(&self, kind: SymbolKind) -> u16 {
        self.counts[kind as usize]
    }

    /// Skip indices of a kind without declaring names for them.
    ///
    /// Methods reserve argument 0 for the receiver object.
    pub fn reserve(&mut self, kind: SymbolKind, count: u16) {
        self.counts[kind as usize] += count;
    }

    /// Remove every symbol and restart all counters.
    pub fn reset(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.counts = [0; SymbolKind::COUNT];
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Symbols in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.buckets.iter().flatten()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Dumps the table bucket by bucket, chained entries indented.
impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, bucket) in self.buckets.iter().enumerate() {
            for (n, symbol) in bucket.iter().enumerate() {
                let lead = if n == 0 { format!("[{i}]") } else { "    ->".to_owned() };
                writeln!(
                    f,
                    "{lead} NAME: {}, TYPE: {}, KIND: {}, INDEX: {}",
                    symbol.name, symbol.ty, symbol.kind, symbol.index
                )?;
            }
        }
        Ok(())
    }
}

/// Bucket of a name.
///
/// `h = c + 31 * h` over the bytes of the name, with wrapping
/// 32-bit arithmetic, modulo the table size.
pub fn hash_name(name: &str) -> usize {
    let hash = name.bytes().fold(0u32, |h, c| {
        (c as u32).wrapping_add((h << 5).wrapping_sub(h))
    });
    hash as usize % TABLE_SIZE
}

/// Resolve a name in the subroutine scope, falling back
/// to the class scope.
pub fn resolve<'a>(subroutine: &'a SymbolTable, class: &'a SymbolTable, name: &str) -> Option<&'a Symbol> {
    subroutine.lookup(name).or_else(|| class.lookup(name))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_indices_per_kind() {
        let mut table = SymbolTable::new();

        assert_eq!(table.insert("a", "int", SymbolKind::Field), Ok(0));
        assert_eq!(table.insert("b", "int", SymbolKind::Static), Ok(0));
        assert_eq!(table.insert("c", "Point", SymbolKind::Field), Ok(1));
        assert_eq!(table.insert("d", "boolean", SymbolKind::Static), Ok(1));

        assert_eq!(table.kind_count(SymbolKind::Field), 2);
        assert_eq!(table.kind_count(SymbolKind::Static), 2);
        assert_eq!(table.kind_count(SymbolKind::Local), 0);

        let c = table.lookup("c").unwrap();
        assert_eq!(c.ty, "Point");
        assert_eq!(c.kind, SymbolKind::Field);
        assert_eq!(c.index, 1);
        assert_eq!(c.segment(), Segment::This);
    }

    #[test]
    fn test_missing_name() {
        let mut table = SymbolTable::new();
        table.insert("x", "int", SymbolKind::Local).unwrap();
        assert!(table.lookup("y").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table = SymbolTable::new();
        table.insert("x", "int", SymbolKind::Local).unwrap();

        let err = table.insert("x", "char", SymbolKind::Argument).unwrap_err();
        assert_eq!(err.name, "x");

        // Counter of the rejected kind is untouched.
        assert_eq!(table.kind_count(SymbolKind::Argument), 0);
        assert_eq!(table.lookup("x").unwrap().ty, "int");
    }

    #[test]
    fn test_reset() {
        let mut table = SymbolTable::new();
        table.reserve(SymbolKind::Argument, 1);
        table.insert("x", "int", SymbolKind::Argument).unwrap();
        assert_eq!(table.lookup("x").unwrap().index, 1);

        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.kind_count(SymbolKind::Argument), 0);
        assert_eq!(table.insert("y", "int", SymbolKind::Argument), Ok(0));
    }

    #[test]
    fn test_hash_name() {
        assert_eq!(hash_name(""), 0);
        // 'a' = 97
        assert_eq!(hash_name("a"), 97 % TABLE_SIZE);
        // 'a' * 31 + 'b' = 3105
        assert_eq!(hash_name("ab"), 3105 % TABLE_SIZE);
        // Long names wrap instead of overflowing.
        let _ = hash_name("aVeryLongIdentifierNameThatOverflowsThirtyTwoBits");
    }

    #[test]
    fn test_colliding_names_keep_order() {
        // 'a' = 97 and 'B' = 66 share bucket 4.
        assert_eq!(hash_name("a"), hash_name("B"));

        let mut table = SymbolTable::new();
        table.insert("a", "int", SymbolKind::Local).unwrap();
        table.insert("B", "char", SymbolKind::Local).unwrap();

        assert_eq!(table.lookup("a").unwrap().index, 0);
        assert_eq!(table.lookup("B").unwrap().index, 1);
        assert_eq!(
            table.to_string(),
            "[4] NAME: a, TYPE: int, KIND: var, INDEX: 0\n    -> NAME: B, TYPE: char, KIND: var, INDEX: 1\n"
        );
    }

    #[test]
    fn test_resolve_prefers_subroutine() {
        let mut class = SymbolTable::new();
        let mut subroutine = SymbolTable::new();
        class.insert("x", "int", SymbolKind::Field).unwrap();
        class.insert("y", "int", SymbolKind::Field).unwrap();
        subroutine.insert("x", "int", SymbolKind::Local).unwrap();

        assert_eq!(resolve(&subroutine, &class, "x").unwrap().kind, SymbolKind::Local);
        assert_eq!(resolve(&subroutine, &class, "y").unwrap().kind, SymbolKind::Field);
        assert!(resolve(&subroutine, &class, "z").is_none());
    }

    #[test]
    fn test_display_dump() {
        let mut table = SymbolTable::new();
        table.insert("a", "int", SymbolKind::Field).unwrap();
        assert_eq!(table.to_string(), "[4] NAME: a, TYPE: int, KIND: field, INDEX: 0\n");
    }
}
