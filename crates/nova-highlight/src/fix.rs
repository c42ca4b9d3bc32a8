//! Suggested fixes.
//!
//! Fixes are plain values: the checks only describe *what* could be done and
//! the editor integration layer decides how to apply them.

use nova_core::JavaLanguageLevel;
use nova_types::Modifier;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fix {
    AddInitializer { variable: String },
    PullUpAsAbstract { method: String },
    ConvertSwitchToIf,
    AddTypeCast { ty: String },
    WrapWithAdapter { from: String, to: String },
    IncreaseLanguageLevel { level: JavaLanguageLevel },
    DeleteCatch { exception: String },
    DeleteMultiCatchAlternative { exception: String },
    MoveCatchUp { exception: String },
    ChangeReturnType { new_type: String },
    AddReturnStatement,
    CreateMethod { name: String },
    CreateConstructor { class: String },
    AddToExtendsList { class: String, ty: String },
    RemoveModifier { modifier: Modifier },
    AddModifier { modifier: Modifier },
    ChangeVariableType { variable: String, new_type: String },
    ImplementMethods,
    MakeClassAbstract { class: String },
    DeleteElement,
    AddExceptionToThrows { exceptions: Vec<String> },
    SurroundWithTryCatch,
    AddMissingAttributes { names: Vec<String> },
    DeleteMethodBody,
    AddMethodBody,
    RenameFile { new_name: String },
    ReplacePrimitiveWithBoxed { boxed: String },
    CastArgument { index: usize, ty: String },
    RemoveReturnValue,
}

impl Fix {
    /// Stable identifier of the fix kind.
    pub fn name(&self) -> &'static str {
        match self {
            Fix::AddInitializer { .. } => "add-initializer",
            Fix::PullUpAsAbstract { .. } => "pull-up-as-abstract",
            Fix::ConvertSwitchToIf => "convert-switch-to-if",
            Fix::AddTypeCast { .. } => "add-type-cast",
            Fix::WrapWithAdapter { .. } => "wrap-with-adapter",
            Fix::IncreaseLanguageLevel { .. } => "increase-language-level",
            Fix::DeleteCatch { .. } => "delete-catch",
            Fix::DeleteMultiCatchAlternative { .. } => "delete-multi-catch-alternative",
            Fix::MoveCatchUp { .. } => "move-catch-up",
            Fix::ChangeReturnType { .. } => "change-return-type",
            Fix::AddReturnStatement => "add-return-statement",
            Fix::CreateMethod { .. } => "create-method",
            Fix::CreateConstructor { .. } => "create-constructor",
            Fix::AddToExtendsList { .. } => "add-to-extends-list",
            Fix::RemoveModifier { .. } => "remove-modifier",
            Fix::AddModifier { .. } => "add-modifier",
            Fix::ChangeVariableType { .. } => "change-variable-type",
            Fix::ImplementMethods => "implement-methods",
            Fix::MakeClassAbstract { .. } => "make-class-abstract",
            Fix::DeleteElement => "delete-element",
            Fix::AddExceptionToThrows { .. } => "add-exception-to-throws",
            Fix::SurroundWithTryCatch => "surround-with-try-catch",
            Fix::AddMissingAttributes { .. } => "add-missing-attributes",
            Fix::DeleteMethodBody => "delete-method-body",
            Fix::AddMethodBody => "add-method-body",
            Fix::RenameFile { .. } => "rename-file",
            Fix::ReplacePrimitiveWithBoxed { .. } => "replace-primitive-with-boxed",
            Fix::CastArgument { .. } => "cast-argument",
            Fix::RemoveReturnValue => "remove-return-value",
        }
    }
}
