use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::db::repositories::level_repository::LevelRepository;
use crate::db::repositories::profile_repository::ProfileRepository;
use crate::db::repositories::xp_repository::XpRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::gamification::{LevelDefinition, LevelInfo, LevelUpCheck, XpAward, XpSource};

/// Level definitions change rarely; a 5-minute-stale snapshot is fine.
const CACHE_TTL_SECONDS: i64 = 300;

/// Compiled fallback so level resolution never fails outright.
fn fallback_levels() -> Vec<LevelDefinition> {
    [
        (1, "Dreamer", 0, "🌱"),
        (2, "Explorer", 100, "🧭"),
        (3, "Builder", 500, "🔨"),
        (4, "Launcher", 1500, "🚀"),
        (5, "Founder", 5000, "👑"),
    ]
    .into_iter()
    .map(|(level, title, min_xp, icon)| LevelDefinition {
        level,
        title: title.to_string(),
        min_xp,
        icon: icon.to_string(),
    })
    .collect()
}

#[derive(Clone)]
struct CachedLevels {
    definitions: Vec<LevelDefinition>,
    fetched_at: DateTime<Utc>,
}

/// Explicitly constructed TTL snapshot cache. Readers inside the TTL
/// window share one snapshot; the first reader after expiry refreshes it.
/// Duplicate refreshes under concurrent expiry are harmless.
pub struct LevelCache {
    inner: RwLock<Option<CachedLevels>>,
    ttl: Duration,
}

impl LevelCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl,
        }
    }

    fn get(&self, now: DateTime<Utc>) -> Option<Vec<LevelDefinition>> {
        let guard = self.inner.read().ok()?;
        let cached = guard.as_ref()?;
        if now.signed_duration_since(cached.fetched_at) < self.ttl {
            Some(cached.definitions.clone())
        } else {
            None
        }
    }

    fn store(&self, definitions: Vec<LevelDefinition>, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(CachedLevels {
                definitions,
                fetched_at: now,
            });
        }
    }
}

pub struct LevelService {
    db: DbPool,
    cache: LevelCache,
}

impl LevelService {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            cache: LevelCache::new(Duration::seconds(CACHE_TTL_SECONDS)),
        }
    }

    /// Current level definitions: cached snapshot, then the configuration
    /// table, then the compiled fallback. Never errors.
    pub fn definitions(&self) -> Vec<LevelDefinition> {
        self.definitions_at(Utc::now())
    }

    pub fn definitions_at(&self, now: DateTime<Utc>) -> Vec<LevelDefinition> {
        if let Some(cached) = self.cache.get(now) {
            return cached;
        }

        let definitions = match self.load_definitions() {
            Ok(definitions) => definitions,
            Err(err) => {
                warn!(
                    target: "app::gamification",
                    error = %err,
                    "level definitions unavailable, using fallback"
                );
                fallback_levels()
            }
        };

        self.cache.store(definitions.clone(), now);
        definitions
    }

    fn load_definitions(&self) -> AppResult<Vec<LevelDefinition>> {
        let conn = self.db.get_connection()?;
        let definitions = LevelRepository::list(&conn)?;

        if let Err(reason) = validate_definitions(&definitions) {
            warn!(
                target: "app::gamification",
                reason,
                "configured level definitions rejected, using fallback"
            );
            return Ok(fallback_levels());
        }

        Ok(definitions)
    }

    pub fn level_info(&self, xp: i64) -> LevelInfo {
        level_info_for(&self.definitions(), xp)
    }

    pub fn level_info_at(&self, xp: i64, now: DateTime<Utc>) -> LevelInfo {
        level_info_for(&self.definitions_at(now), xp)
    }

    pub fn check_level_up(&self, old_xp: i64, new_xp: i64) -> LevelUpCheck {
        check_level_up_for(&self.definitions(), old_xp, new_xp)
    }

    /// Award XP: log the transaction, bump the profile, and persist a new
    /// level when a threshold was crossed.
    pub fn award_xp(&self, user_id: &str, amount: i64, source: XpSource) -> AppResult<XpAward> {
        self.award_xp_at(user_id, amount, source, Utc::now())
    }

    pub fn award_xp_at(
        &self,
        user_id: &str,
        amount: i64,
        source: XpSource,
        now: DateTime<Utc>,
    ) -> AppResult<XpAward> {
        let conn = self.db.get_connection()?;

        let (old_xp, new_xp) = ProfileRepository::add_xp(&conn, user_id, amount)?;
        XpRepository::insert(&conn, user_id, amount, source, &now.to_rfc3339())?;

        let check = check_level_up_for(&self.definitions_at(now), old_xp, new_xp);
        if let Some(new_level) = &check.new_level {
            ProfileRepository::set_level(&conn, user_id, new_level.level)?;
            info!(
                target: "app::gamification",
                user_id,
                level = new_level.level,
                title = %new_level.title,
                "level up"
            );
        } else {
            debug!(target: "app::gamification", user_id, amount, source = %source, "xp awarded");
        }

        Ok(XpAward {
            old_xp,
            new_xp,
            leveled_up: check.leveled_up,
            new_level: check.new_level,
        })
    }
}

fn validate_definitions(definitions: &[LevelDefinition]) -> Result<(), &'static str> {
    if definitions.is_empty() {
        return Err("empty definition list");
    }
    let first = &definitions[0];
    if first.level != 1 || first.min_xp != 0 {
        return Err("level 1 must start at 0 XP");
    }
    for pair in definitions.windows(2) {
        if pair[1].min_xp <= pair[0].min_xp || pair[1].level <= pair[0].level {
            return Err("levels must be strictly increasing");
        }
    }
    Ok(())
}

/// Highest level whose threshold is at or below `xp`. Definitions are
/// pre-sorted ascending by `min_xp`.
pub fn level_info_for(definitions: &[LevelDefinition], xp: i64) -> LevelInfo {
    let xp = xp.max(0);

    let index = definitions
        .iter()
        .rposition(|definition| definition.min_xp <= xp)
        .unwrap_or(0);
    let current = &definitions[index];
    let next = definitions.get(index + 1);

    let xp_into_level = xp - current.min_xp;
    let (xp_required_for_next, progress_percent) = match next {
        Some(next) => {
            let required = next.min_xp - current.min_xp;
            let percent = ((xp_into_level as f64 / required as f64) * 100.0).round() as i64;
            (required, percent.clamp(0, 100))
        }
        None => (0, 100),
    };

    LevelInfo {
        level: current.level,
        title: current.title.clone(),
        icon: current.icon.clone(),
        xp_into_level,
        xp_required_for_next,
        progress_percent,
        next_level_xp: next.map(|definition| definition.min_xp),
    }
}

/// Detect a threshold strictly above `old_xp` and at or below `new_xp`.
/// When one award crosses several boundaries, the first (lowest) crossed
/// level is reported.
pub fn check_level_up_for(
    definitions: &[LevelDefinition],
    old_xp: i64,
    new_xp: i64,
) -> LevelUpCheck {
    let crossed = definitions
        .iter()
        .find(|definition| definition.min_xp > old_xp && definition.min_xp <= new_xp);

    LevelUpCheck {
        leveled_up: crossed.is_some(),
        new_level: crossed.cloned(),
    }
}
