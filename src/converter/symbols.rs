//! Allocation of einsum index symbols.

/// Hands out one single-character index symbol per distinct wire.
///
/// The sequence is `a..z`, `A..Z`, and from the 53rd symbol onwards Unicode
/// code points starting at `U+00C0`. Symbols are never handed out twice for
/// the same expression: a contracted index must occur on exactly its two edge
/// endpoints, so a "retired" symbol cannot be recycled without corrupting the
/// contraction in any flat einsum engine. Extending the alphabet keeps deep
/// circuits representable anyway.
#[derive(Debug, Default)]
pub(crate) struct SymbolPool {
    next: usize,
}

impl SymbolPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next unused symbol.
    pub fn fresh(&mut self) -> char {
        let index = self.next;
        self.next += 1;
        Self::symbol(index)
    }

    /// The symbol at a given position of the sequence.
    pub fn symbol(index: usize) -> char {
        match index {
            0..=25 => (b'a' + index as u8) as char,
            26..=51 => (b'A' + (index - 26) as u8) as char,
            _ => {
                // 52 maps to U+00C0; stay below the surrogate range.
                let code = 140 + u32::try_from(index).expect("symbol index fits in u32");
                assert!(code < 0xD800, "index alphabet exhausted");
                char::from_u32(code).expect("valid code point below the surrogate range")
            }
        }
    }
}
