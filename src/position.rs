//! User position resolution
//!
//! The position comes from outside the locator (browser geolocation, a query
//! parameter, a configured default). Whatever goes wrong while obtaining it,
//! the rest of the locator only ever sees "a position" or "no position".

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::geo::GeoPoint;

/// Supplies the user's position at most once per request
pub trait PositionProvider {
    /// `Ok(None)` means geolocation is unsupported or was denied
    async fn current_position(&self) -> Result<Option<GeoPoint>>;
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub GeoPoint);

impl PositionProvider for FixedPosition {
    async fn current_position(&self) -> Result<Option<GeoPoint>> {
        Ok(Some(self.0))
    }
}

/// Geolocation unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

impl PositionProvider for NoPosition {
    async fn current_position(&self) -> Result<Option<GeoPoint>> {
        Ok(None)
    }
}

/// Raw latitude/longitude pair as sent by a client; either half may be missing
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedPosition {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PositionProvider for ReportedPosition {
    async fn current_position(&self) -> Result<Option<GeoPoint>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(Some(GeoPoint::new(lat, lng)?)),
            _ => Ok(None),
        }
    }
}

/// Resolve the provider's position, waiting at most `timeout`.
///
/// Never fails: provider errors and timeouts resolve to `None`, which sends
/// the selector down its fallback path.
pub async fn resolve_position<P: PositionProvider>(
    provider: &P,
    timeout: Duration,
) -> Option<GeoPoint> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(Ok(Some(position))) => {
            debug!("Resolved user position: {}", position);
            Some(position)
        }
        Ok(Ok(None)) => {
            debug!("User position unavailable");
            None
        }
        Ok(Err(e)) => {
            warn!("Position lookup failed, continuing without position: {}", e);
            None
        }
        Err(_) => {
            warn!(
                "Position lookup timed out after {}ms, continuing without position",
                timeout.as_millis()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FailingPosition;

    impl PositionProvider for FailingPosition {
        async fn current_position(&self) -> Result<Option<GeoPoint>> {
            Err(anyhow!("permission denied"))
        }
    }

    struct SlowPosition;

    impl PositionProvider for SlowPosition {
        async fn current_position(&self) -> Result<Option<GeoPoint>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some(GeoPoint::new(37.5, 127.0)?))
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_fixed_position_resolves() {
        let p = GeoPoint::new(37.5, 127.0).unwrap();
        assert_eq!(resolve_position(&FixedPosition(p), TIMEOUT).await, Some(p));
    }

    #[tokio::test]
    async fn test_no_position_resolves_to_none() {
        assert_eq!(resolve_position(&NoPosition, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_errors_resolve_to_none() {
        assert_eq!(resolve_position(&FailingPosition, TIMEOUT).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_to_none() {
        assert_eq!(resolve_position(&SlowPosition, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_reported_position() {
        let full = ReportedPosition {
            lat: Some(37.5),
            lng: Some(127.0),
        };
        assert_eq!(
            resolve_position(&full, TIMEOUT).await,
            Some(GeoPoint::new(37.5, 127.0).unwrap())
        );

        let half = ReportedPosition {
            lat: Some(37.5),
            lng: None,
        };
        assert_eq!(resolve_position(&half, TIMEOUT).await, None);

        let out_of_range = ReportedPosition {
            lat: Some(137.5),
            lng: Some(127.0),
        };
        assert_eq!(resolve_position(&out_of_range, TIMEOUT).await, None);
    }
}
