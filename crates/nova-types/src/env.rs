use std::collections::HashMap;

use crate::{
    AnnotationAttribute, AnnotationInfo, ClassDef, ClassId, ClassKind, ElementType, FieldDef,
    FieldId, MethodDef, MethodId, Modifier, Modifiers, PrimitiveType, Type, TypeParamDef,
    TypeVarId,
};

/// Read-only view of declared classes, members and type parameters.
///
/// Implemented by [`TypeStore`] and by per-expression wrappers such as
/// [`crate::CaptureContext`] that add context-local type variables.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn method(&self, id: MethodId) -> Option<&MethodDef>;
    fn field(&self, id: FieldId) -> Option<&FieldDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

/// Handles for JDK types the checks refer to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub comparable: ClassId,
    pub number: ClassId,
    pub throwable: ClassId,
    pub exception: ClassId,
    pub runtime_exception: ClassId,
    pub error: ClassId,
    pub enum_: ClassId,
    pub annotation: ClassId,
    pub iterable: ClassId,
    pub auto_closeable: ClassId,
    pub class: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub override_: ClassId,
    pub functional_interface: ClassId,
    pub safe_varargs: ClassId,
    pub repeatable: ClassId,
    pub target: ClassId,
}

impl WellKnownTypes {
    const PLACEHOLDER: WellKnownTypes = WellKnownTypes {
        object: ClassId(0),
        string: ClassId(0),
        cloneable: ClassId(0),
        serializable: ClassId(0),
        comparable: ClassId(0),
        number: ClassId(0),
        throwable: ClassId(0),
        exception: ClassId(0),
        runtime_exception: ClassId(0),
        error: ClassId(0),
        enum_: ClassId(0),
        annotation: ClassId(0),
        iterable: ClassId(0),
        auto_closeable: ClassId(0),
        class: ClassId(0),
        boolean: ClassId(0),
        byte: ClassId(0),
        short: ClassId(0),
        character: ClassId(0),
        integer: ClassId(0),
        long: ClassId(0),
        float: ClassId(0),
        double: ClassId(0),
        override_: ClassId(0),
        functional_interface: ClassId(0),
        safe_varargs: ClassId(0),
        repeatable: ClassId(0),
        target: ClassId(0),
    };

    pub fn boxed(&self, p: PrimitiveType) -> ClassId {
        match p {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    pub fn unboxed(&self, id: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|p| self.boxed(*p) == id)
    }
}

/// Owned storage for declarations.
///
/// Hosts populate it from source and class files; tests start from
/// [`TypeStore::with_minimal_jdk`] and add their own classes.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    methods: Vec<MethodDef>,
    fields: Vec<FieldDef>,
    type_params: Vec<TypeParamDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl TypeStore {
    fn empty() -> Self {
        Self {
            classes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            type_params: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes::PLACEHOLDER,
        }
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.classes.push(def);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.idx())
    }

    /// Adds a method or constructor and appends it to its owner's member list.
    pub fn add_method(&mut self, def: MethodDef) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        if let Some(owner) = self.classes.get_mut(def.owner.idx()) {
            owner.methods.push(id);
        }
        self.methods.push(def);
        id
    }

    pub fn add_field(&mut self, def: FieldDef) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        if let Some(owner) = self.classes.get_mut(def.owner.idx()) {
            owner.fields.push(id);
        }
        self.fields.push(def);
        id
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    /// Replaces the bounds of `id`; needed for F-bounded parameters such as
    /// `E extends Enum<E>` whose bound mentions the class being declared.
    pub fn set_type_param_bounds(&mut self, id: TypeVarId, upper_bounds: Vec<Type>) {
        if let Some(tp) = self.type_params.get_mut(id.idx()) {
            tp.upper_bounds = upper_bounds;
        }
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// `Type::class(self.class_id(name), vec![])`, or `Unknown` for missing classes.
    pub fn class_type(&self, name: &str) -> Type {
        self.class_id(name)
            .map(|id| Type::class(id, vec![]))
            .unwrap_or(Type::Unknown)
    }

    /// A small but coherent slice of `java.lang`, `java.io` and `java.util`.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::empty();
        let mut jdk = JdkBuilder { store: &mut store };
        let wk = jdk.build();
        store.well_known = wk;
        store
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx())
    }

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.methods.get(id.idx())
    }

    fn field(&self, id: FieldId) -> Option<&FieldDef> {
        self.fields.get(id.idx())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

struct JdkBuilder<'a> {
    store: &'a mut TypeStore,
}

impl JdkBuilder<'_> {
    fn class(
        &mut self,
        name: &str,
        kind: ClassKind,
        mods: &[Modifier],
        super_class: Option<Type>,
        interfaces: Vec<Type>,
    ) -> ClassId {
        let mut def = ClassDef::new(name, kind);
        def.modifiers = Modifiers::new(mods).with(Modifier::Public);
        def.super_class = super_class;
        def.interfaces = interfaces;
        self.store.add_class(def)
    }

    fn generic(&mut self, id: ClassId, params: Vec<TypeVarId>) {
        if let Some(def) = self.store.class_mut(id) {
            def.type_params = params;
        }
    }

    fn method(&mut self, owner: ClassId, name: &str, params: Vec<Type>, ret: Type, mods: &[Modifier]) {
        let def = MethodDef::new(name, owner, params, ret)
            .with_modifiers(&[&[Modifier::Public][..], mods].concat());
        self.store.add_method(def);
    }

    fn abstract_method(&mut self, owner: ClassId, name: &str, params: Vec<Type>, ret: Type) {
        self.method(owner, name, params, ret, &[Modifier::Abstract]);
    }

    fn ctor(&mut self, owner: ClassId, params: Vec<Type>) {
        let def = MethodDef::constructor(owner, params).with_modifiers(&[Modifier::Public]);
        self.store.add_method(def);
    }

    fn annotation(&mut self, name: &str, targets: Option<Vec<ElementType>>, attributes: Vec<AnnotationAttribute>) -> ClassId {
        let annotation = Type::class(self.store.well_known_annotation(), vec![]);
        let id = self.class(name, ClassKind::Annotation, &[], None, vec![annotation]);
        if let Some(def) = self.store.class_mut(id) {
            def.annotation = Some(AnnotationInfo {
                targets,
                repeatable_container: None,
                attributes,
            });
        }
        id
    }

    fn exception(&mut self, name: &str, super_class: ClassId) -> ClassId {
        let string = self.store.class_type("java.lang.String");
        let id = self.class(
            name,
            ClassKind::Class,
            &[],
            Some(Type::class(super_class, vec![])),
            vec![],
        );
        self.ctor(id, vec![]);
        self.ctor(id, vec![string]);
        id
    }

    fn build(&mut self) -> WellKnownTypes {
        use ClassKind::*;
        use Modifier::*;

        let object = self.class("java.lang.Object", Class, &[], None, vec![]);
        let obj = Type::class(object, vec![]);
        self.ctor(object, vec![]);
        self.method(object, "equals", vec![obj.clone()], Type::boolean(), &[]);
        self.method(object, "hashCode", vec![], Type::int(), &[]);

        let serializable = self.class("java.io.Serializable", Interface, &[], None, vec![]);
        let cloneable = self.class("java.lang.Cloneable", Interface, &[], None, vec![]);
        let char_sequence = self.class("java.lang.CharSequence", Interface, &[], None, vec![]);
        let ser = Type::class(serializable, vec![]);

        let comparable_t = self.store.add_type_param("T", vec![]);
        let comparable = self.class("java.lang.Comparable", Interface, &[], None, vec![]);
        self.generic(comparable, vec![comparable_t]);
        self.abstract_method(comparable, "compareTo", vec![Type::TypeVar(comparable_t)], Type::int());

        let string = self.class(
            "java.lang.String",
            Class,
            &[Final],
            Some(obj.clone()),
            vec![ser.clone(), Type::class(char_sequence, vec![]), Type::class(comparable, vec![])],
        );
        let string_ty = Type::class(string, vec![]);
        if let Some(def) = self.store.class_mut(string) {
            def.interfaces[2] = Type::class(comparable, vec![string_ty.clone()]);
        }
        self.ctor(string, vec![]);
        self.method(string, "length", vec![], Type::int(), &[]);
        self.method(object, "toString", vec![], string_ty.clone(), &[]);

        let number = self.class("java.lang.Number", Class, &[Abstract], Some(obj.clone()), vec![ser.clone()]);
        let mut boxed = Vec::new();
        for p in PrimitiveType::ALL {
            let super_class = if p.is_numeric() && p != PrimitiveType::Char {
                Type::class(number, vec![])
            } else {
                obj.clone()
            };
            let id = self.class(p.boxed_name(), Class, &[Final], Some(super_class), vec![ser.clone()]);
            let self_ty = Type::class(id, vec![]);
            if let Some(def) = self.store.class_mut(id) {
                def.interfaces.push(Type::class(comparable, vec![self_ty]));
            }
            self.ctor(id, vec![Type::Primitive(p)]);
            boxed.push(id);
        }

        let throwable = self.class("java.lang.Throwable", Class, &[], Some(obj.clone()), vec![ser.clone()]);
        self.ctor(throwable, vec![]);
        self.ctor(throwable, vec![string_ty.clone()]);
        self.method(throwable, "getMessage", vec![], string_ty.clone(), &[]);
        let exception = self.exception("java.lang.Exception", throwable);
        let runtime_exception = self.exception("java.lang.RuntimeException", exception);
        let error = self.exception("java.lang.Error", throwable);
        self.exception("java.lang.IllegalArgumentException", runtime_exception);
        self.exception("java.lang.IllegalStateException", runtime_exception);
        self.exception("java.lang.NullPointerException", runtime_exception);
        self.exception("java.lang.InterruptedException", exception);
        self.exception("java.lang.CloneNotSupportedException", exception);
        let io_exception = self.exception("java.io.IOException", exception);
        self.exception("java.io.FileNotFoundException", io_exception);

        let class_t = self.store.add_type_param("T", vec![]);
        let class = self.class("java.lang.Class", Class, &[Final], Some(obj.clone()), vec![ser.clone()]);
        self.generic(class, vec![class_t]);

        let enum_e = self.store.add_type_param("E", vec![]);
        let enum_ = self.class("java.lang.Enum", Class, &[Abstract], Some(obj.clone()), vec![ser.clone()]);
        self.generic(enum_, vec![enum_e]);
        let enum_of_e = Type::class(enum_, vec![Type::TypeVar(enum_e)]);
        self.store.set_type_param_bounds(enum_e, vec![enum_of_e]);
        if let Some(def) = self.store.class_mut(enum_) {
            def.interfaces
                .push(Type::class(comparable, vec![Type::TypeVar(enum_e)]));
        }
        self.method(enum_, "name", vec![], string_ty.clone(), &[Final]);
        let ctor = MethodDef::constructor(enum_, vec![string_ty.clone(), Type::int()])
            .with_modifiers(&[Protected]);
        self.store.add_method(ctor);

        let runnable = self.class("java.lang.Runnable", Interface, &[], None, vec![]);
        self.abstract_method(runnable, "run", vec![], Type::Void);
        let auto_closeable = self.class("java.lang.AutoCloseable", Interface, &[], None, vec![]);
        let close = MethodDef::new("close", auto_closeable, vec![], Type::Void)
            .with_modifiers(&[Public, Abstract])
            .with_throws(vec![Type::class(exception, vec![])]);
        self.store.add_method(close);
        let closeable = self.class(
            "java.io.Closeable",
            Interface,
            &[],
            None,
            vec![Type::class(auto_closeable, vec![])],
        );
        let close = MethodDef::new("close", closeable, vec![], Type::Void)
            .with_modifiers(&[Public, Abstract])
            .with_throws(vec![Type::class(io_exception, vec![])]);
        self.store.add_method(close);

        let iterable_t = self.store.add_type_param("T", vec![]);
        let iterable = self.class("java.lang.Iterable", Interface, &[], None, vec![]);
        self.generic(iterable, vec![iterable_t]);

        let collection_e = self.store.add_type_param("E", vec![]);
        let collection = self.class(
            "java.util.Collection",
            Interface,
            &[],
            None,
            vec![Type::class(iterable, vec![Type::TypeVar(collection_e)])],
        );
        self.generic(collection, vec![collection_e]);
        self.abstract_method(collection, "size", vec![], Type::int());
        self.abstract_method(collection, "add", vec![Type::TypeVar(collection_e)], Type::boolean());

        let list_e = self.store.add_type_param("E", vec![]);
        let list = self.class(
            "java.util.List",
            Interface,
            &[],
            None,
            vec![Type::class(collection, vec![Type::TypeVar(list_e)])],
        );
        self.generic(list, vec![list_e]);
        self.abstract_method(list, "get", vec![Type::int()], Type::TypeVar(list_e));

        let array_list_e = self.store.add_type_param("E", vec![]);
        let array_list = self.class(
            "java.util.ArrayList",
            Class,
            &[],
            Some(obj.clone()),
            vec![Type::class(list, vec![Type::TypeVar(array_list_e)]), ser.clone()],
        );
        self.generic(array_list, vec![array_list_e]);
        self.ctor(array_list, vec![]);
        self.method(array_list, "size", vec![], Type::int(), &[]);
        self.method(array_list, "add", vec![Type::TypeVar(array_list_e)], Type::boolean(), &[]);
        self.method(array_list, "get", vec![Type::int()], Type::TypeVar(array_list_e), &[]);

        let map_k = self.store.add_type_param("K", vec![]);
        let map_v = self.store.add_type_param("V", vec![]);
        let map = self.class("java.util.Map", Interface, &[], None, vec![]);
        self.generic(map, vec![map_k, map_v]);
        let hash_map_k = self.store.add_type_param("K", vec![]);
        let hash_map_v = self.store.add_type_param("V", vec![]);
        let hash_map = self.class(
            "java.util.HashMap",
            Class,
            &[],
            Some(obj.clone()),
            vec![Type::class(map, vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)])],
        );
        self.generic(hash_map, vec![hash_map_k, hash_map_v]);
        self.ctor(hash_map, vec![]);

        let annotation = self.class("java.lang.annotation.Annotation", Interface, &[], None, vec![]);
        self.store.well_known.annotation = annotation;
        let element_type = self.class(
            "java.lang.annotation.ElementType",
            Enum,
            &[Final],
            Some(Type::class(enum_, vec![])),
            vec![],
        );
        let element_type_ty = Type::class(element_type, vec![]);
        if let Some(def) = self.store.class_mut(element_type) {
            def.super_class = Some(Type::class(enum_, vec![element_type_ty.clone()]));
        }
        let override_ = self.annotation("java.lang.Override", Some(vec![ElementType::Method]), vec![]);
        let functional_interface =
            self.annotation("java.lang.FunctionalInterface", Some(vec![ElementType::Type]), vec![]);
        let safe_varargs = self.annotation(
            "java.lang.SafeVarargs",
            Some(vec![ElementType::Constructor, ElementType::Method]),
            vec![],
        );
        self.annotation("java.lang.Deprecated", None, vec![]);
        self.annotation(
            "java.lang.SuppressWarnings",
            None,
            vec![AnnotationAttribute {
                name: "value".into(),
                ty: Type::array(string_ty.clone()),
                has_default: false,
            }],
        );
        let repeatable = self.annotation(
            "java.lang.annotation.Repeatable",
            Some(vec![ElementType::AnnotationType]),
            vec![AnnotationAttribute {
                name: "value".into(),
                ty: Type::class(class, vec![Type::extends(Type::class(annotation, vec![]))]),
                has_default: false,
            }],
        );
        let target = self.annotation(
            "java.lang.annotation.Target",
            Some(vec![ElementType::AnnotationType]),
            vec![AnnotationAttribute {
                name: "value".into(),
                ty: Type::array(element_type_ty),
                has_default: false,
            }],
        );

        WellKnownTypes {
            object,
            string,
            cloneable,
            serializable,
            comparable,
            number,
            throwable,
            exception,
            runtime_exception,
            error,
            enum_,
            annotation,
            iterable,
            auto_closeable,
            class,
            boolean: boxed[0],
            byte: boxed[1],
            short: boxed[2],
            character: boxed[3],
            integer: boxed[4],
            long: boxed[5],
            float: boxed[6],
            double: boxed[7],
            override_,
            functional_interface,
            safe_varargs,
            repeatable,
            target,
        }
    }
}

impl TypeStore {
    fn well_known_annotation(&self) -> ClassId {
        self.well_known.annotation
    }
}
