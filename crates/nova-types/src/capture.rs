use std::fmt;

use crate::{
    glb, ClassDef, ClassId, ClassType, FieldDef, FieldId, MethodDef, MethodId, Type, TypeEnv,
    TypeParamDef, TypeVarId, WellKnownTypes, WildcardBound,
};

/// Per-expression typing context that owns capture variables.
///
/// Capture conversion allocates fresh `CAP#n` type variables here instead of in
/// the shared [`crate::TypeStore`]; dropping the context forgets them.
pub struct CaptureContext<'env> {
    base: &'env dyn TypeEnv,
    locals: Vec<TypeParamDef>,
}

impl fmt::Debug for CaptureContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureContext")
            .field("locals", &self.locals)
            .finish_non_exhaustive()
    }
}

impl<'env> CaptureContext<'env> {
    pub fn new(base: &'env dyn TypeEnv) -> Self {
        Self {
            base,
            locals: Vec::new(),
        }
    }

    fn add_capture_var(&mut self, upper_bounds: Vec<Type>, lower_bound: Option<Type>) -> TypeVarId {
        let idx = self.locals.len() as u32;
        self.locals.push(TypeParamDef {
            name: format!("CAP#{}", idx + 1),
            upper_bounds,
            lower_bound,
        });
        TypeVarId::new_context_local(idx)
    }

    /// Capture conversion (JLS 5.1.10).
    ///
    /// Every wildcard argument of a class type becomes a fresh type variable whose
    /// upper bound is the glb of the wildcard bound and the declared bound.
    /// Non-class types and types without wildcards are returned unchanged.
    pub fn capture_wildcards(&mut self, ty: &Type) -> Type {
        let Type::Class(ClassType { def, args, outer }) = ty else {
            return ty.clone();
        };
        if !args.iter().any(|a| matches!(a, Type::Wildcard(_))) {
            return ty.clone();
        }
        let object = Type::class(self.well_known().object, Vec::new());
        let formal_bounds: Vec<Type> = match self.class(*def) {
            Some(class_def) => class_def
                .type_params
                .iter()
                .map(|tp| {
                    self.type_param(*tp)
                        .and_then(|d| d.upper_bounds.first().cloned())
                        .unwrap_or_else(|| object.clone())
                })
                .collect(),
            None => return ty.clone(),
        };

        let mut new_args = Vec::with_capacity(args.len());
        for (idx, arg) in args.iter().enumerate() {
            let formal = formal_bounds.get(idx).cloned().unwrap_or_else(|| object.clone());
            let captured = match arg {
                Type::Wildcard(WildcardBound::Unbounded) => {
                    Type::TypeVar(self.add_capture_var(vec![formal], None))
                }
                Type::Wildcard(WildcardBound::Extends(upper)) => {
                    let bound = glb(&*self, &formal, upper);
                    Type::TypeVar(self.add_capture_var(vec![bound], None))
                }
                Type::Wildcard(WildcardBound::Super(lower)) => {
                    Type::TypeVar(self.add_capture_var(vec![formal], Some((**lower).clone())))
                }
                other => other.clone(),
            };
            new_args.push(captured);
        }

        Type::Class(ClassType {
            def: *def,
            args: new_args,
            outer: outer.clone(),
        })
    }
}

impl TypeEnv for CaptureContext<'_> {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.base.class(id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.base.method(id)
    }

    fn field(&self, id: FieldId) -> Option<&FieldDef> {
        self.base.field(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if let Some(idx) = id.context_local_index() {
            return self.locals.get(idx);
        }
        self.base.type_param(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.base.lookup_class(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.base.well_known()
    }
}

impl TypeVarId {
    const CONTEXT_LOCAL_BIT: u32 = 1 << 31;

    pub(crate) fn new_context_local(index: u32) -> Self {
        Self(Self::CONTEXT_LOCAL_BIT | index)
    }

    pub(crate) fn context_local_index(self) -> Option<usize> {
        if (self.0 & Self::CONTEXT_LOCAL_BIT) == 0 {
            return None;
        }
        Some((self.0 & !Self::CONTEXT_LOCAL_BIT) as usize)
    }
}

/// Convenience wrapper: capture `ty` in a throwaway context.
///
/// The returned type references context-local variables, so it is only
/// meaningful while `cx` is alive.
pub fn capture_wildcards(cx: &mut CaptureContext<'_>, ty: &Type) -> Type {
    cx.capture_wildcards(ty)
}
