//! Hierarchical instance name grammar.
//!
//! Names are dot-separated paths such as `REGF[3].RFW.BIT[12].FF` or
//! `DEC0.D2.AND5`. DEF-escaped subscripts (`BIT\[12\]`) are read the same
//! way as plain ones.

use regex::Regex;

// Role tokens shared with the netlist generator.
pub const CLKGATE: &str = "CG";
pub const CLKGATE_AND: &str = "CGAND";
pub const INV1: &str = "INV1";
pub const INV2: &str = "INV2";
pub const BIT: &str = "BIT";
pub const FF: &str = "FF";
pub const OBUF1: &str = "OBUF1";
pub const OBUF2: &str = "OBUF2";
pub const REGF: &str = "REGF";
pub const RFW: &str = "RFW";
pub const RFW0: &str = "RFW0";
pub const TIE: &str = "TIE";
pub const DEC: &str = "DEC";
pub const DEC_STAGE: &str = "D";
pub const AND: &str = "AND";
pub const ABUF: &str = "ABUF";
pub const ENBUF: &str = "ENBUF";

/// Name of the capture group holding a role index.
pub const INDEX: &str = "index";

/// A bus segment `token[i]`, capturing `i` as the index.
pub fn bus(token: &str) -> String {
    format!(r"{}\\?\[(?P<{INDEX}>\d+)\\?\]", regex::escape(token))
}

/// A segment made of `token` directly followed by digits, capturing them as the index.
pub fn numbered(token: &str) -> String {
    format!(r"{}(?P<{INDEX}>\d+)", regex::escape(token))
}

/// Like [`numbered`], without capturing the digits.
pub fn any_numbered(token: &str) -> String {
    format!(r"{}\d+", regex::escape(token))
}

/// A segment that is exactly `token`.
pub fn lit(token: &str) -> String {
    regex::escape(token)
}

/// Compiles a run of segment patterns that is searched for anywhere in a
/// name. Matches only start and end on segment boundaries.
pub fn pattern(segments: &[String]) -> Regex {
    let body = segments.join(r"\.");
    match Regex::new(&format!(r"(?:^|\.){body}(?:\.|$)")) {
        Ok(re) => re,
        Err(e) => panic!("Error compiling name pattern: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index<'a>(re: &Regex, name: &'a str) -> Option<&'a str> {
        re.captures(name)?.name(INDEX).map(|m| m.as_str())
    }

    #[test]
    fn test_pattern_search() {
        let ff = pattern(&[bus(BIT), lit(FF)]);
        assert_eq!(index(&ff, "REGF[3].RFW.BIT[12].FF"), Some("12"));
        assert_eq!(index(&ff, r"REGF\[3\].RFW.BIT\[7\].FF"), Some("7"));
        assert!(!ff.is_match("REGF[3].RFW.BIT[12].OBUF1"));
        assert!(!ff.is_match("BIT[x].FF"));
        // Segments must match whole.
        assert!(!ff.is_match("XBIT[1].FF"));
        assert!(!ff.is_match("BIT[1].FFX"));
    }

    #[test]
    fn test_numbered_segments() {
        let stage = pattern(&[any_numbered(DEC), numbered(DEC_STAGE)]);
        let two_four = pattern(&[any_numbered(DEC), lit(DEC_STAGE)]);

        assert_eq!(index(&stage, "DEC1.D3.AND7"), Some("3"));
        assert!(!stage.is_match("DEC1.D.AND2"));
        assert!(two_four.is_match("DEC1.D.AND2"));
        assert!(!two_four.is_match("DEC1.D3.AND7"));
        // `DEC` is not a numbered `D` segment.
        assert!(!pattern(&[numbered(DEC_STAGE)]).is_match("DEC0"));
    }

    #[test]
    fn test_literal_segments() {
        let cg_and = pattern(&[lit(CLKGATE_AND)]);
        assert!(cg_and.is_match("REGF[1].RFW.CGAND"));
        assert!(!cg_and.is_match("REGF[1].RFW.CGAND[0]"));
        assert!(!pattern(&[bus(CLKGATE)]).is_match("REGF[1].RFW.CGAND"));
    }
}
