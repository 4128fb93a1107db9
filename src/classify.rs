//! Byte classification.
//!
//! Every key byte falls into one of four coarse character classes. Two
//! adjacent key positions are candidates for merging into a single printed
//! range when their observed byte envelopes cover the same set of classes,
//! so the classifier also provides the printable representative bounds of a
//! class ('0'..'9' for digits, and so on).

/// Coarse class of a single ASCII byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// '0'..'9'
    Digit,
    /// 'a'..'z'
    LowerAlpha,
    /// 'A'..'Z'
    UpperAlpha,
    /// Everything else.
    Punct,
}

impl CharClass {
    /// Classify a single byte.
    pub fn of(byte: u8) -> CharClass {
        match byte {
            b'0'..=b'9' => CharClass::Digit,
            b'a'..=b'z' => CharClass::LowerAlpha,
            b'A'..=b'Z' => CharClass::UpperAlpha,
            _ => CharClass::Punct,
        }
    }

    /// Canonical printable bounds for this class.
    pub fn representative(self) -> (u8, u8) {
        match self {
            CharClass::Digit => (b'0', b'9'),
            CharClass::LowerAlpha => (b'a', b'z'),
            CharClass::UpperAlpha => (b'A', b'Z'),
            CharClass::Punct => (b'!', b'}'),
        }
    }

    fn bit(self) -> u8 {
        match self {
            CharClass::Digit => 0x1,
            CharClass::LowerAlpha => 0x2,
            CharClass::UpperAlpha => 0x4,
            CharClass::Punct => 0x8,
        }
    }
}

/// Set of character classes covered by a byte envelope.
///
/// An envelope may span more than one class (e.g. '0'-'Z' covers digits and
/// uppercase), so the set is the union of the classes of its two bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassSet(u8);

impl ClassSet {
    /// Class set of the envelope `[start, end]`.
    pub fn of_envelope(start: u8, end: u8) -> ClassSet {
        ClassSet(CharClass::of(start).bit() | CharClass::of(end).bit())
    }
}

/// Printable representative for an envelope: the left bound comes from the
/// class of `start`, the right bound from the class of `end`, so a
/// digit+uppercase envelope renders as `[0-Z]`.
pub fn class_envelope(start: u8, end: u8) -> (u8, u8) {
    (
        CharClass::of(start).representative().0,
        CharClass::of(end).representative().1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bytes() {
        assert_eq!(CharClass::of(b'0'), CharClass::Digit);
        assert_eq!(CharClass::of(b'9'), CharClass::Digit);
        assert_eq!(CharClass::of(b'a'), CharClass::LowerAlpha);
        assert_eq!(CharClass::of(b'Z'), CharClass::UpperAlpha);
        assert_eq!(CharClass::of(b'-'), CharClass::Punct);
        assert_eq!(CharClass::of(b'.'), CharClass::Punct);
        assert_eq!(CharClass::of(0x00), CharClass::Punct);
    }

    #[test]
    fn test_class_set_union() {
        // A bound in another class changes the set; widening within one
        // class does not.
        let digits = ClassSet::of_envelope(b'0', b'9');
        let mixed = ClassSet::of_envelope(b'5', b'K');
        assert_ne!(mixed, digits);
        assert_eq!(mixed, ClassSet::of_envelope(b'0', b'Z'));
    }

    #[test]
    fn test_class_set_matches_across_different_bounds() {
        // Partial digit coverage still classifies identically, which is what
        // drives class-based merging of adjacent positions.
        assert_eq!(
            ClassSet::of_envelope(b'0', b'5'),
            ClassSet::of_envelope(b'2', b'9')
        );
    }

    #[test]
    fn test_envelope_representative() {
        assert_eq!(class_envelope(b'3', b'7'), (b'0', b'9'));
        assert_eq!(class_envelope(b'5', b'K'), (b'0', b'Z'));
        assert_eq!(class_envelope(b'-', b'4'), (b'!', b'9'));
    }
}
