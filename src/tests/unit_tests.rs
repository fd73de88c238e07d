mod chained_map {
    use std::collections::hash_map::RandomState;
    use std::collections::{BTreeSet, HashMap};
    use std::hash::{BuildHasherDefault, Hash, Hasher};
    use std::panic::{RefUnwindSafe, UnwindSafe};
    use std::rc::Rc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering::Relaxed;
    use std::sync::Arc;

    use proptest::prelude::*;

    use crate::chained_map::Iter;
    use crate::{ChainedHashMap, Equivalent};

    static_assertions::assert_impl_all!(ChainedHashMap<String, String>: Send, Sync, RefUnwindSafe, UnwindSafe);
    static_assertions::assert_impl_all!(ChainedHashMap<String, String>: Clone, Default, Eq);
    static_assertions::assert_impl_all!(Iter<'static, String, String>: Send, Sync, ExactSizeIterator);
    static_assertions::assert_not_impl_any!(ChainedHashMap<Rc<String>, Rc<String>>: Send, Sync);
    static_assertions::assert_not_impl_any!(ChainedHashMap<String, *const String>: Send, Sync);

    /// Sends every key to the same bucket.
    #[derive(Default)]
    struct Collide;

    impl Hasher for Collide {
        fn finish(&self) -> u64 {
            7
        }
        fn write(&mut self, _bytes: &[u8]) {}
    }

    type Colliding = BuildHasherDefault<Collide>;

    struct Data {
        data: usize,
        checker: Arc<AtomicUsize>,
    }

    impl Data {
        fn new(data: usize, checker: Arc<AtomicUsize>) -> Data {
            checker.fetch_add(1, Relaxed);
            Data { data, checker }
        }
    }

    impl Clone for Data {
        fn clone(&self) -> Self {
            Data::new(self.data, self.checker.clone())
        }
    }

    impl Drop for Data {
        fn drop(&mut self) {
            self.checker.fetch_sub(1, Relaxed);
        }
    }

    impl Eq for Data {}

    impl Hash for Data {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.data.hash(state);
        }
    }

    impl PartialEq for Data {
        fn eq(&self, other: &Self) -> bool {
            self.data == other.data
        }
    }

    #[derive(Debug, Eq, PartialEq)]
    struct EqTest(String, usize);

    impl Equivalent<EqTest> for str {
        fn equivalent(&self, key: &EqTest) -> bool {
            key.0.eq(self)
        }
    }

    impl Hash for EqTest {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.0.hash(state);
        }
    }

    #[test]
    fn equivalent() {
        let mut map: ChainedHashMap<EqTest, usize> = ChainedHashMap::new(2);
        assert!(map.set(EqTest("HELLO".to_owned(), 1), 1));
        assert!(!map.contains("NO"));
        assert!(map.contains("HELLO"));
        assert_eq!(map.delete("HELLO"), Some(1));
    }

    #[test]
    fn empty() {
        let mut map: ChainedHashMap<&str, &str> = ChainedHashMap::new(5);
        assert!(map.get("Edmund").is_none());
        assert!(map.delete("Edmund").is_none());
        assert!(map.get("Urjit").is_none());
        assert!(map.delete("Urjit").is_none());
        assert_eq!(map.len(), 0);
        assert_eq!(map.load(), Some(0.0));
        assert!(map.iter().next().is_none());
    }

    #[test]
    fn zero_capacity() {
        let mut map: ChainedHashMap<&str, &str> = ChainedHashMap::new(0);
        assert_eq!(map.capacity(), 0);
        assert!(map.is_full());
        assert_eq!(map.load(), None);
        assert!(!map.set("Edmund", "Chinese"));
        assert_eq!(map.try_set("Edmund", "Chinese"), Err(("Edmund", "Chinese")));
        assert!(map.get("Edmund").is_none());
        assert!(map.get_mut("Edmund").is_none());
        assert!(map.delete("Edmund").is_none());
        assert!(map.bucket_index("Edmund").is_none());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn set_get_delete() {
        let mut map: ChainedHashMap<&str, &str> = ChainedHashMap::new(5);
        assert!(map.set("Edmund", "Chinese"));
        assert!(map.set("Urjit", "Indian"));
        assert_eq!(map.load(), Some(0.2));
        assert_eq!(map.get("Edmund"), Some(&"Chinese"));
        assert_eq!(map.get("Urjit"), Some(&"Indian"));
        assert_eq!(map.delete("Edmund"), Some("Chinese"));
        assert_eq!(map.delete("Urjit"), Some("Indian"));
        assert!(map.delete("John").is_none());
        assert!(map.delete("William").is_none());
        assert_eq!(map.load(), Some(0.0));

        assert!(map.set("Edmund", "Chinese"));
        assert_eq!(map.get("Edmund"), Some(&"Chinese"));
        assert_eq!(map.delete("Edmund"), Some("Chinese"));
        assert!(map.is_empty());
    }

    #[test]
    fn update() {
        let mut map: ChainedHashMap<u64, u64> = ChainedHashMap::new(4);
        assert_eq!(map.try_set(3, 1), Ok(None));
        assert_eq!(map.try_set(3, 2), Ok(Some(1)));
        assert!(map.set(3, 5));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&3), Some(&5));

        *map.get_mut(&3).unwrap() += 1;
        assert_eq!(map.get(&3), Some(&6));
        assert_eq!(map.iter().count(), 1);
    }

    #[test]
    fn full() {
        let mut map: ChainedHashMap<u64, u64> = ChainedHashMap::new(1);
        assert!(map.set(1, 1));
        assert!(map.set(2, 2));
        assert!(map.is_full());
        assert_eq!(map.load(), Some(1.0));

        assert!(!map.set(3, 3));
        assert!(!map.set(1, 10));
        assert_eq!(map.try_set(2, 20), Err((2, 20)));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&1));
        assert_eq!(map.get(&2), Some(&2));
        assert!(map.get(&3).is_none());

        // In-place modification is not a set.
        *map.get_mut(&1).unwrap() = 10;
        assert_eq!(map.get(&1), Some(&10));

        assert_eq!(map.delete(&2), Some(2));
        assert!(!map.is_full());
        assert!(map.set(3, 3));
        assert!(!map.set(1, 1));
    }

    #[test]
    fn collision() {
        let mut map: ChainedHashMap<u64, u64, Colliding> =
            ChainedHashMap::with_hasher(8, Colliding::default());
        let index = map.bucket_index(&0);
        for k in 0..16 {
            assert_eq!(map.bucket_index(&k), index);
            assert!(map.set(k, k * 2));
        }
        assert!(!map.set(16, 32));
        for k in 0..16 {
            assert_eq!(map.get(&k), Some(&(k * 2)));
        }
        for k in (0..16).step_by(2) {
            assert_eq!(map.delete(&k), Some(k * 2));
        }
        for k in 0..16 {
            assert_eq!(map.get(&k).is_some(), k % 2 == 1);
        }
        assert_eq!(map.len(), 8);
        assert_eq!(map.load(), Some(0.5));
    }

    #[test]
    fn bucket_index() {
        let map: ChainedHashMap<u64, u64> = ChainedHashMap::new(32);
        for k in 0..1024 {
            let index = map.bucket_index(&k).unwrap();
            assert!(index < map.capacity());
            assert_eq!(map.bucket_index(&k), Some(index));
        }
    }

    #[test]
    fn iter_scan() {
        let mut map: ChainedHashMap<usize, usize> = ChainedHashMap::new(16);
        for k in 0..20 {
            assert!(map.set(k, k + 1));
        }
        let iter = map.iter();
        assert_eq!(iter.len(), 20);
        let keys: BTreeSet<usize> = iter.map(|(k, _)| *k).collect();
        assert_eq!(keys, (0..20).collect::<BTreeSet<_>>());

        let mut sum = 0;
        map.scan(|k, v| {
            assert_eq!(*k + 1, *v);
            sum += *v;
        });
        assert_eq!(sum, (1..=20).sum::<usize>());

        let mut cnt = 0;
        for (k, v) in &map {
            assert_eq!(*k + 1, *v);
            cnt += 1;
        }
        assert_eq!(cnt, 20);
    }

    #[test]
    fn retain_clear() {
        let checker = Arc::new(AtomicUsize::new(0));
        let mut map: ChainedHashMap<Data, Data> = ChainedHashMap::new(32);
        for d in 0..64 {
            assert!(map.set(Data::new(d, checker.clone()), Data::new(d, checker.clone())));
        }
        assert_eq!(checker.load(Relaxed), 128);

        map.retain(|k, v| {
            v.data += 1;
            k.data % 4 == 0
        });
        assert_eq!(map.len(), 16);
        assert_eq!(checker.load(Relaxed), 32);
        map.scan(|k, v| assert_eq!(k.data + 1, v.data));

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 64);
        assert_eq!(checker.load(Relaxed), 0);
    }

    #[test]
    fn drop_entries() {
        let checker = Arc::new(AtomicUsize::new(0));
        let mut map: ChainedHashMap<Data, Data> = ChainedHashMap::new(2);
        for d in 0..4 {
            assert!(map.set(Data::new(d, checker.clone()), Data::new(d, checker.clone())));
        }
        assert_eq!(checker.load(Relaxed), 8);

        // A rejected pair is handed back intact.
        let rejected = map.try_set(Data::new(9, checker.clone()), Data::new(9, checker.clone()));
        assert!(rejected.is_err());
        assert_eq!(checker.load(Relaxed), 10);
        drop(rejected);
        assert_eq!(checker.load(Relaxed), 8);

        // The replaced value and the duplicate key are dropped.
        assert!(map.delete(&Data::new(0, checker.clone())).is_some());
        assert!(map.set(Data::new(1, checker.clone()), Data::new(10, checker.clone())));
        assert_eq!(checker.load(Relaxed), 6);

        let cloned = map.clone();
        assert_eq!(checker.load(Relaxed), 12);
        assert!(cloned == map);
        drop(cloned);

        drop(map);
        assert_eq!(checker.load(Relaxed), 0);
    }

    #[test]
    fn eq_debug() {
        let mut small: ChainedHashMap<u64, u64> = ChainedHashMap::new(1);
        let mut large: ChainedHashMap<u64, u64> = ChainedHashMap::new(16);
        assert_eq!(small, large);
        assert!(small.set(1, 2));
        assert_ne!(small, large);
        assert!(large.set(1, 2));
        assert_eq!(small, large);
        assert!(large.set(1, 3));
        assert_ne!(small, large);

        assert_eq!(format!("{small:?}"), "{1: 2}");
        let empty: ChainedHashMap<u64, u64> = ChainedHashMap::default();
        assert_eq!(format!("{empty:?}"), "{}");
    }

    #[test]
    fn string_keys() {
        let mut map: ChainedHashMap<String, String, RandomState> = ChainedHashMap::new(2);
        assert!(map.set("a".to_owned(), "1".to_owned()));
        assert!(map.set("b".to_owned(), "2".to_owned()));
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
        assert_eq!(
            map.delete_entry("b"),
            Some(("b".to_owned(), "2".to_owned()))
        );
        assert!(!map.contains("b"));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Set(u8, u32),
        Get(u8),
        Delete(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0_u8..24, any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
            (0_u8..24).prop_map(Op::Get),
            (0_u8..24).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn model(size in 0_usize..12, ops in prop::collection::vec(op(), 0..128)) {
            let mut map: ChainedHashMap<u8, u32> = ChainedHashMap::new(size);
            let mut model: HashMap<u8, u32> = HashMap::new();
            let capacity = size * 2;
            for op in ops {
                match op {
                    Op::Set(k, v) => {
                        let expected = if model.len() >= capacity {
                            false
                        } else {
                            model.insert(k, v);
                            true
                        };
                        prop_assert_eq!(map.set(k, v), expected);
                    }
                    Op::Get(k) => prop_assert_eq!(map.get(&k), model.get(&k)),
                    Op::Delete(k) => prop_assert_eq!(map.delete(&k), model.remove(&k)),
                }
                prop_assert_eq!(map.len(), model.len());
                prop_assert!(map.len() <= map.capacity());
                #[allow(clippy::cast_precision_loss)]
                let load = (capacity != 0).then(|| model.len() as f64 / capacity as f64);
                prop_assert_eq!(map.load(), load);
            }
            prop_assert_eq!(map.iter().len(), model.len());
            for (k, v) in &map {
                prop_assert_eq!(model.get(k), Some(v));
            }
        }

        #[cfg_attr(miri, ignore)]
        #[test]
        fn placement(keys in prop::collection::btree_set(any::<u64>(), 1..64)) {
            let mut map: ChainedHashMap<u64, u64> = ChainedHashMap::new(keys.len());
            for k in &keys {
                prop_assert!(map.set(*k, !*k));
            }
            prop_assert!(map.is_full());
            for k in &keys {
                let index = map.bucket_index(k).unwrap();
                prop_assert!(index < map.capacity());
                prop_assert_eq!(map.get(k), Some(&!*k));
            }
        }
    }
}

#[cfg(feature = "serde")]
mod serde {
    use std::fmt;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_test::{assert_de_tokens, assert_de_tokens_error, assert_tokens, Token};

    use crate::ChainedHashMap;

    /// Compares capacity and load on top of the entries.
    struct Exact(ChainedHashMap<u64, i16>);

    impl PartialEq for Exact {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
                && self.0.capacity() == other.0.capacity()
                && self.0.load() == other.0.load()
        }
    }

    impl fmt::Debug for Exact {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Exact")
                .field("capacity", &self.0.capacity())
                .field("entries", &self.0)
                .finish()
        }
    }

    impl Serialize for Exact {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.0.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Exact {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            ChainedHashMap::deserialize(deserializer).map(Exact)
        }
    }

    fn tokens(size: u64, entries: &[(u64, i16)]) -> Vec<Token> {
        let mut tokens = vec![
            Token::Struct {
                name: "ChainedHashMap",
                len: 2,
            },
            Token::Str("size"),
            Token::U64(size),
            Token::Str("entries"),
            Token::Map {
                len: Some(entries.len()),
            },
        ];
        for (k, v) in entries {
            tokens.push(Token::U64(*k));
            tokens.push(Token::I16(*v));
        }
        tokens.push(Token::MapEnd);
        tokens.push(Token::StructEnd);
        tokens
    }

    #[test]
    fn chained_map() {
        let mut map: ChainedHashMap<u64, i16> = ChainedHashMap::new(5);
        assert!(map.set(2, -6));
        assert_tokens(&Exact(map), &tokens(5, &[(2, -6)]));
    }

    #[test]
    fn capacity_preserved() {
        let map: ChainedHashMap<u64, i16> = ChainedHashMap::new(5);
        assert_eq!(map.load(), Some(0.0));
        assert_tokens(&Exact(map), &tokens(5, &[]));

        let mut map: ChainedHashMap<u64, i16> = ChainedHashMap::new(5);
        assert!(map.set(1, 1));
        assert_eq!(map.load(), Some(0.1));
        assert_tokens(&Exact(map), &tokens(5, &[(1, 1)]));

        let map: ChainedHashMap<u64, i16> = ChainedHashMap::new(0);
        assert_tokens(&Exact(map), &tokens(0, &[]));
    }

    #[test]
    fn duplicate_keys() {
        // The last value of a repeated key wins, even when the map is already full.
        let mut expected: ChainedHashMap<u64, i16> = ChainedHashMap::new(1);
        assert!(expected.set(1, 3));
        assert!(expected.set(2, 2));
        assert_de_tokens(&Exact(expected), &tokens(1, &[(1, 1), (2, 2), (1, 3)]));
    }

    #[test]
    fn over_capacity() {
        assert_de_tokens_error::<Exact>(
            &tokens(1, &[(1, 1), (2, 2), (3, 3)]),
            "more than 2 distinct keys for size 1",
        );
        assert_de_tokens_error::<Exact>(
            &tokens(0, &[(1, 1)]),
            "more than 0 distinct keys for size 0",
        );
    }

    #[test]
    fn missing_size() {
        assert_de_tokens_error::<Exact>(
            &[
                Token::Struct {
                    name: "ChainedHashMap",
                    len: 1,
                },
                Token::Str("entries"),
                Token::Map { len: Some(0) },
                Token::MapEnd,
                Token::StructEnd,
            ],
            "missing field `size`",
        );
    }
}
