use std::borrow::Borrow;
use std::hash::Hash;

use ahash::HashMap;

pub(crate) trait InternId: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! intern_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(u32);

        impl InternId for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                $name(index as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

intern_id!(
    /// Id of an interned name: a local name within a namespace.
    NameId
);
intern_id!(
    /// Id of an interned namespace URI.
    NamespaceId
);
intern_id!(
    /// Id of an interned namespace prefix.
    PrefixId
);

/// A local name within a namespace.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) struct Name {
    pub(crate) local: String,
    pub(crate) namespace_id: NamespaceId,
}

impl Name {
    pub(crate) fn new(local: &str, namespace_id: NamespaceId) -> Self {
        Name {
            local: local.to_string(),
            namespace_id,
        }
    }
}

/// Hands out one small id per distinct value. Ids are never reused; an
/// interned value lives as long as the table.
pub(crate) struct Interner<K, V> {
    values: Vec<V>,
    ids: HashMap<V, K>,
}

impl<K: InternId, V: Eq + Hash + Clone> Interner<K, V> {
    pub(crate) fn new() -> Self {
        Interner {
            values: Vec::new(),
            ids: HashMap::default(),
        }
    }

    pub(crate) fn get<Q>(&self, value: &Q) -> Option<K>
    where
        V: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.ids.get(value).copied()
    }

    pub(crate) fn intern(&mut self, value: V) -> K {
        if let Some(id) = self.ids.get(&value) {
            return *id;
        }
        let id = K::from_index(self.values.len());
        self.ids.insert(value.clone(), id);
        self.values.push(value);
        id
    }

    #[inline]
    pub(crate) fn value(&self, id: K) -> &V {
        &self.values[id.index()]
    }
}

pub(crate) type NameTable = Interner<NameId, Name>;
pub(crate) type NamespaceTable = Interner<NamespaceId, String>;
pub(crate) type PrefixTable = Interner<PrefixId, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let mut table = PrefixTable::new();
        let a = table.intern("a".to_string());
        let b = table.intern("b".to_string());
        assert_ne!(a, b);
        assert_eq!(table.intern("a".to_string()), a);
        assert_eq!(table.value(b), "b");
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut table = NamespaceTable::new();
        assert_eq!(table.get("urn:x"), None);
        let id = table.intern("urn:x".to_string());
        assert_eq!(table.get("urn:x"), Some(id));
        assert_eq!(table.get("urn:y"), None);
    }

    #[test]
    fn test_names_differ_by_namespace() {
        let mut namespaces = NamespaceTable::new();
        let none = namespaces.intern(String::new());
        let x = namespaces.intern("urn:x".to_string());
        let mut names = NameTable::new();
        let plain = names.intern(Name::new("a", none));
        let qualified = names.intern(Name::new("a", x));
        assert_ne!(plain, qualified);
        assert_eq!(names.value(qualified).namespace_id, x);
    }
}
