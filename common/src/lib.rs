use std::hash::{Hash, Hasher};

#[macro_export]
macro_rules! unwrap_or {
    ($e: expr, $t: expr) => {
        match $e {
            Some(x) => x,
            None => $t,
        }
    };
}

#[macro_export]
macro_rules! unwrap_ret {
    ($e: expr) => {
        $crate::unwrap_ret!($e, ())
    };
    ($e: expr, $ret: expr) => {
        match $e {
            Some(x) => x,
            None => return $ret,
        }
    };
}

#[macro_export]
macro_rules! unwrap_cont {
    ($e: expr) => {
        match $e {
            Some(x) => x,
            None => continue,
        }
    };
}

#[macro_export]
macro_rules! unwrap_orr {
    ($e: expr, $t: expr) => {
        match $e {
            Ok(x) => x,
            Err(_) => $t,
        }
    };
}

/// Like `unwrap_ret!` but logs a warning before returning `$ret`
#[macro_export]
macro_rules! unwrap_retlog {
    ($e: expr, $ret: expr, $($t: expr),+) => {
        match $e {
            Some(x) => x,
            None => {
                log::warn!($($t),+);
                return $ret;
            }
        }
    };
}

#[inline]
pub fn hash_u64<T>(obj: T) -> u64
where
    T: Hash,
{
    let mut hasher = FxHasher::default();
    obj.hash(&mut hasher);
    hasher.finish()
}

pub mod logger;
pub mod rand;

use rustc_hash::FxHasher;

pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type FastSet<V> = rustc_hash::FxHashSet<V>;
