//! Icon fetch, run as its own task so asset reads never block the render loop.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use sunshine_ui::Icon;

use crate::device::AssetSource;
use crate::error::FetchError;
use crate::sync::Asset;

/// Identifies the icon fetch a result belongs to. Only results of the latest generation are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Generation(u32);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FetchRequest {
    pub generation: Generation,
    pub asset: Asset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedIcon {
    pub generation: Generation,
    pub result: Result<Icon, FetchError>,
}

/// Read `asset` into `buf` and decode it as an icon.
pub async fn fetch_icon<A: AssetSource>(
    source: &mut A,
    asset: &Asset,
    buf: &mut [u8],
) -> Result<Icon, FetchError<A::Error>> {
    let len = source.open_asset(asset, buf).await?;
    let data = buf.get(..len).ok_or(FetchError::TooLarge)?;
    Ok(Icon::decode(data)?)
}

/// Serve fetch requests forever. Both sides are signals: a newer request replaces one not yet
/// picked up, and a newer result replaces one the render loop has not consumed.
pub async fn fetch_icons<M: RawMutex, A: AssetSource>(
    source: &mut A,
    requests: &Signal<M, FetchRequest>,
    results: &Signal<M, FetchedIcon>,
    buf: &mut [u8],
) {
    loop {
        let request = requests.wait().await;
        debug!("fetching icon {}", request.asset.digest());
        let result = fetch_icon(source, &request.asset, buf).await;
        if let Err(e) = &result {
            warn!("icon {} not loaded: {}", request.asset.digest(), e.as_str());
        }
        results.signal(FetchedIcon {
            generation: request.generation,
            result: result.map_err(FetchError::discard_source),
        });
    }
}
