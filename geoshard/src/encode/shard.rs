//! Splits a road buffer into contiguous shards for parallel workers.

use std::ops::Range;

use tracing::warn;

use super::buffer::RoadBuffer;

/// Partitions `buffer` into at most `n` shards of `ceil(count / n)` features.
///
/// Concatenating the payloads of the returned shards reproduces the payload
/// of `buffer`, in order. Shards that would hold no features are omitted, so
/// fewer than `n` shards may come back. With `n <= 1` the input is returned
/// as the only shard.
///
/// A buffer whose layout ends mid-feature is cut at the last complete
/// feature.
pub fn shard_roads(buffer: RoadBuffer, n: usize) -> Vec<RoadBuffer> {
    if n <= 1 {
        return vec![buffer];
    }

    let spans = feature_spans(&buffer);
    if spans.is_empty() {
        return Vec::new();
    }

    let per_shard = spans.len().div_ceil(n);
    spans
        .chunks(per_shard)
        .map(|chunk| {
            let start = chunk[0].start;
            let end = chunk[chunk.len() - 1].end;
            let mut data = Vec::with_capacity(1 + end - start);
            data.push(chunk.len() as f64);
            data.extend_from_slice(&buffer[start..end]);
            RoadBuffer::from_vec(data)
        })
        .collect()
}

/// Index ranges of each complete road entry, header included.
fn feature_spans(buffer: &RoadBuffer) -> Vec<Range<usize>> {
    let declared = buffer.feature_count();
    let data = buffer.as_slice();
    let mut spans = Vec::with_capacity(declared.min(data.len()));
    let mut offset = 1;

    while spans.len() < declared {
        let Some(&point_count) = data.get(offset + 1) else {
            break;
        };
        if !point_count.is_finite() || point_count < 0.0 || point_count.fract() != 0.0 {
            break;
        }

        let Some(end) = (point_count as usize)
            .checked_mul(2)
            .and_then(|n| n.checked_add(offset + 2))
            .filter(|&end| end <= data.len())
        else {
            break;
        };
        spans.push(offset..end);
        offset = end;
    }

    if spans.len() < declared {
        warn!(
            declared,
            complete = spans.len(),
            "Road buffer ends mid-feature, sharding complete features only"
        );
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_roads;
    use crate::geometry::{Feature, FeatureCollection};
    use proptest::prelude::*;

    fn roads(point_counts: &[usize]) -> RoadBuffer {
        let fc: FeatureCollection = point_counts
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                let line = (0..len).map(|j| (i as f64, j as f64)).collect();
                Feature::road(line, "primary")
            })
            .collect();
        encode_roads(&fc)
    }

    fn concat_payloads(shards: &[RoadBuffer]) -> Vec<f64> {
        shards.iter().flat_map(|s| s.payload().to_vec()).collect()
    }

    #[test]
    fn test_single_shard_returns_input() {
        let buffer = roads(&[2, 3]);
        assert_eq!(shard_roads(buffer.clone(), 1), vec![buffer.clone()]);
        assert_eq!(shard_roads(buffer.clone(), 0), vec![buffer]);
    }

    #[test]
    fn test_ceil_distribution() {
        let shards = shard_roads(roads(&[2, 3, 2, 4, 2]), 3);
        let counts: Vec<_> = shards.iter().map(|s| s.feature_count()).collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_fewer_features_than_shards() {
        let buffer = roads(&[2, 2]);
        let shards = shard_roads(buffer.clone(), 7);
        assert_eq!(shards.len(), 2);
        assert_eq!(concat_payloads(&shards), buffer.payload());
    }

    #[test]
    fn test_uneven_split_omits_empty_shards() {
        // ceil(4 / 3) = 2 per shard, so only two shards are needed
        let shards = shard_roads(roads(&[2, 2, 2, 2]), 3);
        assert_eq!(shards.len(), 2);
    }

    #[test]
    fn test_empty_buffer_yields_no_shards() {
        assert!(shard_roads(roads(&[]), 4).is_empty());
        assert!(shard_roads(RoadBuffer::default(), 4).is_empty());
    }

    #[test]
    fn test_truncated_buffer_keeps_complete_features() {
        let full = roads(&[2, 2, 3]);
        let mut data = full.into_vec();
        data.truncate(data.len() - 1);

        let shards = shard_roads(RoadBuffer::from_vec(data.clone()), 2);
        let total: usize = shards.iter().map(|s| s.feature_count()).sum();
        assert_eq!(total, 2);
        assert_eq!(concat_payloads(&shards), data[1..13].to_vec());
    }

    #[test]
    fn test_oversized_point_count_stops_scan() {
        let shards = shard_roads(RoadBuffer::from_vec(vec![1.0, 0.0, 1e300]), 2);
        assert!(shards.is_empty());

        let mut data = roads(&[2, 2]).into_vec();
        data[0] = 3.0;
        data.extend_from_slice(&[1.0, f64::MAX]);
        let shards = shard_roads(RoadBuffer::from_vec(data), 2);
        let total: usize = shards.iter().map(|s| s.feature_count()).sum();
        assert_eq!(total, 2);
    }

    proptest! {
        /// Property: shards reassemble into the original payload and count.
        #[test]
        fn prop_shards_are_lossless(
            point_counts in prop::collection::vec(0usize..6, 0..40),
            n in prop::sample::select(vec![1usize, 2, 3, 7]),
        ) {
            let buffer = roads(&point_counts);
            let shards = shard_roads(buffer.clone(), n);

            prop_assert!(shards.len() <= n.max(1));
            prop_assert_eq!(concat_payloads(&shards), buffer.payload().to_vec());
            let total: usize = shards.iter().map(|s| s.feature_count()).sum();
            prop_assert_eq!(total, buffer.feature_count());
        }
    }
}
