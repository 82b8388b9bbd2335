use proptest::prelude::*;
use voxmc_vox::{Rgba, VoxModel};

fn arb_model() -> impl Strategy<Value = VoxModel> {
    (1usize..=6, 1usize..=6, 1usize..=6)
        .prop_flat_map(|(sx, sy, sz)| {
            let len = sx * sy * sz;
            (
                Just((sx, sy, sz)),
                proptest::collection::vec(any::<u8>(), len),
                proptest::collection::vec(any::<(u8, u8, u8, u8)>(), 255),
            )
        })
        .prop_map(|((sx, sy, sz), voxels, colors)| {
            let mut m = VoxModel::new(sx, sy, sz);
            m.voxels = voxels;
            for (slot, (r, g, b, a)) in colors.into_iter().enumerate() {
                m.palette[slot + 1] = Rgba::new(r, g, b, a);
            }
            m
        })
}

proptest! {
    // Decode(Encode(v)) == v up to the reserved index-0 palette slot. An
    // all-air model encodes to a zero-count XYZI, which decode rejects, so
    // only inhabited models round-trip.
    #[test]
    fn encode_decode_round_trips(m in arb_model()) {
        prop_assume!(m.occupied_count() > 0);
        let back = VoxModel::decode(&m.encode()).unwrap();
        prop_assert_eq!((back.sx, back.sy, back.sz), (m.sx, m.sy, m.sz));
        prop_assert_eq!(&back.voxels, &m.voxels);
        prop_assert_eq!(&back.palette[1..], &m.palette[1..]);
    }

    // Flipping twice along any axis combination restores the array.
    #[test]
    fn flip_is_an_involution(m in arb_model(), fx: bool, fy: bool, fz: bool) {
        let mut flipped = m.clone();
        flipped.flip(fx, fy, fz);
        flipped.flip(fx, fy, fz);
        prop_assert_eq!(&flipped.voxels, &m.voxels);
    }

    // A single X flip mirrors coordinates exactly.
    #[test]
    fn flip_x_mirrors_coordinates(m in arb_model()) {
        let mut flipped = m.clone();
        flipped.flip(true, false, false);
        for z in 0..m.sz {
            for y in 0..m.sy {
                for x in 0..m.sx {
                    prop_assert_eq!(
                        flipped.get_raw(x, y, z),
                        m.get_raw(m.sx - 1 - x, y, z)
                    );
                }
            }
        }
    }
}
