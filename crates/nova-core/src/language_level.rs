//! Java language level + feature availability model.
//!
//! Semantic checks gate every construct newer than Java 1.4 on the configured
//! language level and report an "insufficient language level" diagnostic when a
//! source file uses a feature its module cannot compile.

use serde::{Deserialize, Serialize};

/// The effective Java language mode for a module/file.
///
/// - `major`: the Java feature release number (4 for 1.4, 5 for 1.5, ..., 8, 11, 17, 21)
/// - `preview`: whether `--enable-preview` is in effect for this major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JavaLanguageLevel {
    pub major: u16,
    #[serde(default)]
    pub preview: bool,
}

impl JavaLanguageLevel {
    pub const JAVA_1_4: Self = Self::new(4);
    pub const JAVA_5: Self = Self::new(5);
    pub const JAVA_6: Self = Self::new(6);
    pub const JAVA_7: Self = Self::new(7);
    pub const JAVA_8: Self = Self::new(8);
    pub const JAVA_9: Self = Self::new(9);
    pub const JAVA_11: Self = Self::new(11);
    pub const JAVA_16: Self = Self::new(16);
    pub const JAVA_17: Self = Self::new(17);
    pub const JAVA_21: Self = Self::new(21);

    #[inline]
    pub const fn new(major: u16) -> Self {
        Self {
            major,
            preview: false,
        }
    }

    #[inline]
    pub const fn with_preview(self, preview: bool) -> Self {
        Self { preview, ..self }
    }

    #[inline]
    pub const fn is_at_least(self, major: u16) -> bool {
        self.major >= major
    }

    pub fn availability(self, feature: JavaFeature) -> FeatureAvailability {
        match feature.stable_since() {
            since if self.major >= since => FeatureAvailability::Stable,
            _ => match feature.preview_since() {
                Some(preview) if self.major >= preview => FeatureAvailability::Preview,
                _ => FeatureAvailability::Unavailable,
            },
        }
    }

    /// Is the feature usable in this configuration? (applies `preview` flag)
    pub fn is_enabled(self, feature: JavaFeature) -> bool {
        match self.availability(feature) {
            FeatureAvailability::Stable => true,
            FeatureAvailability::Preview => self.preview,
            FeatureAvailability::Unavailable => false,
        }
    }

    /// Presentable text, `1.4` style for the pre-5 releases.
    pub fn display_name(self) -> String {
        if self.major < 5 {
            format!("1.{}", self.major)
        } else if self.preview {
            format!("{} (Preview)", self.major)
        } else {
            self.major.to_string()
        }
    }
}

impl Default for JavaLanguageLevel {
    fn default() -> Self {
        JavaLanguageLevel::JAVA_21
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JavaFeature {
    Generics,                  // Java 5
    Annotations,               // Java 5
    ForEach,                   // Java 5
    StaticImports,             // Java 5
    Varargs,                   // Java 5
    Enums,                     // Java 5
    HexFloatingPointLiterals,  // Java 5
    Diamond,                   // Java 7
    MultiCatch,                // Java 7
    TryWithResources,          // Java 7
    StringsInSwitch,           // Java 7
    BinaryLiterals,            // Java 7
    UnderscoresInLiterals,     // Java 7
    Lambdas,                   // Java 8
    MethodReferences,          // Java 8
    DefaultMethods,            // Java 8
    StaticInterfaceMethods,    // Java 8
    RepeatableAnnotations,     // Java 8
    TypeAnnotations,           // Java 8
    PrivateInterfaceMethods,   // Java 9
    DiamondWithAnonymous,      // Java 9
    LocalEnumsAndInterfaces,   // Java 16
    StaticMembersInInnerClass, // Java 16
}

impl JavaFeature {
    pub const fn display_name(self) -> &'static str {
        match self {
            JavaFeature::Generics => "Generics",
            JavaFeature::Annotations => "Annotations",
            JavaFeature::ForEach => "For-each loops",
            JavaFeature::StaticImports => "Static imports",
            JavaFeature::Varargs => "Variable arity methods",
            JavaFeature::Enums => "Enums",
            JavaFeature::HexFloatingPointLiterals => "Hexadecimal floating point literals",
            JavaFeature::Diamond => "Diamond types",
            JavaFeature::MultiCatch => "Multi-catches",
            JavaFeature::TryWithResources => "Try-with-resources",
            JavaFeature::StringsInSwitch => "Strings in 'switch' statements",
            JavaFeature::BinaryLiterals => "Binary literals",
            JavaFeature::UnderscoresInLiterals => "Underscores in literals",
            JavaFeature::Lambdas => "Lambda expressions",
            JavaFeature::MethodReferences => "Method references",
            JavaFeature::DefaultMethods => "Extension methods",
            JavaFeature::StaticInterfaceMethods => "Static interface method calls",
            JavaFeature::RepeatableAnnotations => "Repeated annotations",
            JavaFeature::TypeAnnotations => "Type annotations",
            JavaFeature::PrivateInterfaceMethods => "Private methods in interfaces",
            JavaFeature::DiamondWithAnonymous => "Diamond types in anonymous classes",
            JavaFeature::LocalEnumsAndInterfaces => "Local enums and interfaces",
            JavaFeature::StaticMembersInInnerClass => "Static declarations in inner classes",
        }
    }

    /// First major release where the feature is available without `--enable-preview`.
    pub const fn stable_since(self) -> u16 {
        match self {
            JavaFeature::Generics
            | JavaFeature::Annotations
            | JavaFeature::ForEach
            | JavaFeature::StaticImports
            | JavaFeature::Varargs
            | JavaFeature::Enums
            | JavaFeature::HexFloatingPointLiterals => 5,
            JavaFeature::Diamond
            | JavaFeature::MultiCatch
            | JavaFeature::TryWithResources
            | JavaFeature::StringsInSwitch
            | JavaFeature::BinaryLiterals
            | JavaFeature::UnderscoresInLiterals => 7,
            JavaFeature::Lambdas
            | JavaFeature::MethodReferences
            | JavaFeature::DefaultMethods
            | JavaFeature::StaticInterfaceMethods
            | JavaFeature::RepeatableAnnotations
            | JavaFeature::TypeAnnotations => 8,
            JavaFeature::PrivateInterfaceMethods | JavaFeature::DiamondWithAnonymous => 9,
            JavaFeature::LocalEnumsAndInterfaces | JavaFeature::StaticMembersInInnerClass => 16,
        }
    }

    pub const fn preview_since(self) -> Option<u16> {
        match self {
            JavaFeature::LocalEnumsAndInterfaces => Some(15),
            _ => None,
        }
    }

    /// The language level a "raise language level" fix should switch to.
    pub const fn required_level(self) -> JavaLanguageLevel {
        JavaLanguageLevel::new(self.stable_since())
    }
}

/// Whether the *language* supports a feature in this major version,
/// independent of whether preview is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureAvailability {
    Unavailable,
    Preview,
    Stable,
}
