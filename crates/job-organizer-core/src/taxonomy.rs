use std::ffi::OsStr;
use std::path::Path;

/// Name of the ephemeral extraction workspace inside a job folder.
///
/// Reserved alongside the destination folder names: a delivered subfolder
/// with this name is treated as stale scratch, never as a stray folder.
pub const SCRATCH_DIR_NAME: &str = "temp";

/// A destination subfolder of a job folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Cnc,
    Drawings,
    ExcelFiles,
    Kss,
    ShippingAndBilling,
    ZipFiles,
    Material,
    Archive,
}

impl Destination {
    pub const ALL: [Destination; 8] = [
        Destination::Cnc,
        Destination::Drawings,
        Destination::ExcelFiles,
        Destination::Kss,
        Destination::ShippingAndBilling,
        Destination::ZipFiles,
        Destination::Material,
        Destination::Archive,
    ];

    pub fn folder_name(self) -> &'static str {
        match self {
            Destination::Cnc => "CNC",
            Destination::Drawings => "DRAWINGS",
            Destination::ExcelFiles => "EXCEL FILES",
            Destination::Kss => "KSS",
            Destination::ShippingAndBilling => "SHIPPING AND BILLING",
            Destination::ZipFiles => "ZIP FILES",
            Destination::Material => "MATERIAL",
            Destination::Archive => "ARCHIVE",
        }
    }
}

/// How a file was matched to its destination. The mover uses the selector to
/// pick up sibling files that share the same match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Case-insensitive file extension match.
    Extension(&'static str),
    /// Case-insensitive substring match on the file name.
    NameContains(&'static str),
}

impl Selector {
    pub fn matches(self, file_name: &str) -> bool {
        match self {
            Selector::Extension(ext) => Path::new(file_name)
                .extension()
                .and_then(OsStr::to_str)
                .is_some_and(|e| e.eq_ignore_ascii_case(ext)),
            Selector::NameContains(token) => {
                file_name.to_ascii_lowercase().contains(token)
            }
        }
    }
}

/// A successful classification: where the file goes and the selector that
/// routed it there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub destination: Destination,
    pub selector: Selector,
}

// Extension rules take precedence over name-token rules. Name-token ties
// resolve to the first entry below.
const EXTENSION_RULES: &[(&str, Destination)] = &[
    ("nc1", Destination::Cnc),
    ("nc", Destination::Cnc),
    ("cnc", Destination::Cnc),
    ("step", Destination::Cnc),
    ("stp", Destination::Cnc),
    ("dxf", Destination::Cnc),
    ("pdf", Destination::Drawings),
    ("zip", Destination::ZipFiles),
    ("rar", Destination::ZipFiles),
    ("xlsx", Destination::ExcelFiles),
    ("xlsm", Destination::ExcelFiles),
    ("xls", Destination::ExcelFiles),
    ("kss", Destination::Kss),
];

const NAME_RULES: &[(&str, Destination)] = &[
    ("master", Destination::ShippingAndBilling),
    ("billing", Destination::ShippingAndBilling),
    ("material", Destination::Material),
];

/// The routing rule set for a job folder.
///
/// There is exactly one table, shared by the classifier, the indexer and the
/// orchestrator. Every caller goes through [`Taxonomy::standard`].
#[derive(Debug)]
pub struct Taxonomy {
    extensions: &'static [(&'static str, Destination)],
    name_tokens: &'static [(&'static str, Destination)],
}

static STANDARD: Taxonomy = Taxonomy {
    extensions: EXTENSION_RULES,
    name_tokens: NAME_RULES,
};

impl Taxonomy {
    pub fn standard() -> &'static Taxonomy {
        &STANDARD
    }

    /// Decide a file's destination from its name, or `None` when the file is
    /// unclassified and must be left untouched.
    ///
    /// Extension rules are tried first; name-token rules only apply when no
    /// extension rule matched. At most one destination per file.
    pub fn classify(&self, file_name: &str) -> Option<RuleMatch> {
        if let Some(ext) = Path::new(file_name).extension().and_then(OsStr::to_str) {
            for (rule_ext, destination) in self.extensions {
                if ext.eq_ignore_ascii_case(rule_ext) {
                    return Some(RuleMatch {
                        destination: *destination,
                        selector: Selector::Extension(rule_ext),
                    });
                }
            }
        }

        let lowered = file_name.to_ascii_lowercase();
        for (token, destination) in self.name_tokens {
            if lowered.contains(token) {
                return Some(RuleMatch {
                    destination: *destination,
                    selector: Selector::NameContains(token),
                });
            }
        }

        None
    }

    /// Whether a top-level directory name belongs to the fixed layout.
    /// Reserved names are never swept as stray folders.
    pub fn is_reserved(&self, dir_name: &str) -> bool {
        dir_name == SCRATCH_DIR_NAME
            || Destination::ALL
                .iter()
                .any(|d| d.folder_name() == dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_classification() {
        let tax = Taxonomy::standard();
        assert_eq!(
            tax.classify("part.nc1").map(|m| m.destination),
            Some(Destination::Cnc)
        );
        assert_eq!(
            tax.classify("drawing.pdf").map(|m| m.destination),
            Some(Destination::Drawings)
        );
        assert_eq!(
            tax.classify("payload.rar").map(|m| m.destination),
            Some(Destination::ZipFiles)
        );
        assert_eq!(
            tax.classify("kss combined.kss").map(|m| m.destination),
            Some(Destination::Kss)
        );
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let tax = Taxonomy::standard();
        assert_eq!(
            tax.classify("PART.NC1").map(|m| m.destination),
            Some(Destination::Cnc)
        );
        assert_eq!(
            tax.classify("Drawing.PDF").map(|m| m.destination),
            Some(Destination::Drawings)
        );
    }

    #[test]
    fn test_extension_takes_precedence_over_name_token() {
        // "Material_Master.xlsx" matches two name tokens and an extension;
        // the extension rule wins.
        let tax = Taxonomy::standard();
        assert_eq!(
            tax.classify("Material_Master.xlsx").map(|m| m.destination),
            Some(Destination::ExcelFiles)
        );
    }

    #[test]
    fn test_name_token_order_breaks_ties() {
        // "master" is declared before "material": a name containing both
        // (without a classified extension) routes to SHIPPING AND BILLING.
        let tax = Taxonomy::standard();
        assert_eq!(
            tax.classify("material master list").map(|m| m.destination),
            Some(Destination::ShippingAndBilling)
        );
        assert_eq!(
            tax.classify("MATERIAL TAKEOFF").map(|m| m.destination),
            Some(Destination::Material)
        );
    }

    #[test]
    fn test_unclassified_files() {
        let tax = Taxonomy::standard();
        assert_eq!(tax.classify("readme.txt"), None);
        assert_eq!(tax.classify("photo.jpeg"), None);
        assert_eq!(tax.classify("noextension"), None);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let tax = Taxonomy::standard();
        let first = tax.classify("part.nc1");
        let second = tax.classify("part.nc1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_reserved_names() {
        let tax = Taxonomy::standard();
        assert!(tax.is_reserved("CNC"));
        assert!(tax.is_reserved("SHIPPING AND BILLING"));
        assert!(tax.is_reserved("temp"));
        assert!(!tax.is_reserved("OldQuote"));
        // Reserved names are exact: case differences are a stray folder.
        assert!(!tax.is_reserved("cnc"));
    }
}
