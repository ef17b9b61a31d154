//! Cache em memória com TTL
//!
//! Usado para o cache de modelos do cliente e para os caches de opções de
//! campos personalizados e de responsáveis de cada modelo. Uma entrada é
//! válida enquanto `agora < last_updated_at + ttl`; entradas vencidas são
//! removidas no momento da consulta.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

/// TTL padrão dos caches (30 minutos)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

/// Entrada no cache com timestamp
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<T> {
    last_updated_at: DateTime<Utc>,
    payload: T,
}

impl<T> CacheEntry<T> {
    fn new(payload: T) -> Self {
        Self {
            last_updated_at: Utc::now(),
            payload,
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        Utc::now() < self.last_updated_at + ttl
    }
}

/// Mapa chave → entrada com expiração
#[derive(Debug)]
pub(crate) struct TtlCache<K, T> {
    ttl: Duration,
    entries: HashMap<K, CacheEntry<T>>,
}

impl<K: Eq + Hash, T> TtlCache<K, T> {
    pub(crate) fn new(ttl: std::time::Duration) -> Self {
        let ttl = Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(DEFAULT_CACHE_TTL_SECS as i64));

        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Retorna o payload se a entrada existir e ainda estiver válida.
    ///
    /// Uma entrada vencida é removida antes de retornar `None`.
    pub(crate) fn get_fresh<Q>(&mut self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let fresh = self.entries.get(key)?.is_fresh(self.ttl);

        if !fresh {
            tracing::debug!("🗑️ Entrada de cache vencida removida");
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| &entry.payload)
    }

    /// Insere/substitui a entrada inteira com timestamp atual
    pub(crate) fn insert(&mut self, key: K, payload: T) {
        self.entries.insert(key, CacheEntry::new(payload));
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
