//! Group-wide scans over control bytes.
//!
//! Each slot of a set has a parallel control byte: `0x00` marks an empty
//! slot, and `0x80..=0xFF` marks an occupied slot whose low 7 bits carry a
//! tag derived from the entry's hash. The probe loop inspects control
//! bytes a *group* at a time and asks two questions of every group it
//! loads:
//!
//! - which positions hold a given tag (`match_tag`), and
//! - where is the first empty byte, if any (`first_empty`).
//!
//! Both questions are answered branch-free over the whole group: with a
//! 16-byte SSE2 compare-and-movemask on x86/x86_64, or with 8-byte SWAR
//! arithmetic everywhere else. The SWAR path always loads the group as a
//! little-endian `u64` so the bit positions of the match word line up
//! with byte positions on any host.
//!
//! The backend is chosen through the [`Group`] type parameter of the set
//! types; [`DefaultGroup`] is the widest one available for the target.
//! `first_empty` is exact on every backend. `match_tag` is exact on the
//! SSE2 backend, while the SWAR word math can report extra candidate
//! positions (see [`SwarGroup`]); the probe loops resolve every
//! candidate with a full entry comparison, so probe results are
//! identical either way. The tests in this module check the backends
//! against each other under exactly these guarantees.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;
use core::marker::PhantomData;

use cfg_if::cfg_if;

/// A group-wide view of consecutive control bytes.
///
/// Implementations load `WIDTH` bytes at an arbitrary control-array
/// index and answer tag-match and first-empty queries over the whole
/// group at once. The set types guarantee the load is always in bounds
/// by mirroring the first `WIDTH` control bytes past the end of the
/// array.
pub trait Group: Copy {
    /// Number of control bytes scanned per probe step.
    const WIDTH: usize;

    /// Right shift that converts a trailing-zero count of the match word
    /// into a byte position. Zero for one-bit-per-lane masks, three for
    /// SWAR words that mark matches with `0x80` bytes.
    const STRIDE_SHIFT: u32;

    /// Loads `WIDTH` control bytes starting at `ctrl`.
    ///
    /// # Safety
    ///
    /// `ctrl` must be valid for reads of `WIDTH` bytes. No alignment is
    /// required.
    unsafe fn load(ctrl: *const u8) -> Self;

    /// Returns candidate positions for control bytes equal to `tag`,
    /// lowest position first.
    ///
    /// Every position whose byte equals `tag` is reported, and the
    /// lowest reported position is always a true match, but a backend
    /// may report extra positions whose byte differs from `tag`.
    /// Callers must confirm each candidate against entry storage.
    fn match_tag(self, tag: u8) -> BitMask<Self>;

    /// Returns the position of the first control byte equal to `0x00`,
    /// or `WIDTH` if the group has no empty slot.
    fn first_empty(self) -> usize;
}

/// Positions of matching control bytes within a group.
///
/// Iterates in ascending position order by repeatedly taking the lowest
/// set bit of the underlying match word.
#[derive(Clone, Copy)]
pub struct BitMask<G> {
    bits: u64,
    _group: PhantomData<G>,
}

impl<G: Group> BitMask<G> {
    /// Creates a mask from a raw match word, one set bit per matching
    /// position at the group's stride.
    #[inline(always)]
    pub fn from_word(bits: u64) -> Self {
        BitMask {
            bits,
            _group: PhantomData,
        }
    }

    /// Returns `true` if any position matched.
    #[inline(always)]
    pub fn any(self) -> bool {
        self.bits != 0
    }
}

impl<G: Group> Iterator for BitMask<G> {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            return None;
        }
        let position = (self.bits.trailing_zeros() >> G::STRIDE_SHIFT) as usize;
        self.bits &= self.bits - 1;
        Some(position)
    }
}

/// Byte repeated across every lane of a `u64`.
const SWAR_ONES: u64 = 0x0101_0101_0101_0101;

/// High bit of every lane of a `u64`.
const SWAR_HIGH_BITS: u64 = 0x8080_8080_8080_8080;

/// Software matcher scanning 8 control bytes as one little-endian `u64`.
///
/// Zero-byte detection uses `(w - 0x01..01) & !w & 0x80..80`; matching
/// an arbitrary tag XORs the group with the tag repeated across all
/// lanes first, so equal bytes become zero lanes. The subtraction
/// borrow can also flag a `0x01` lane sitting directly above a flagged
/// run, so `match_tag` may report extra positions holding `tag ^ 0x01`.
/// The lowest flagged lane is always genuine, which keeps `first_empty`
/// exact; the probe loops discard match extras through entry
/// comparison, as a tag always has its high bit set and `tag ^ 0x01`
/// therefore marks an occupied slot.
#[derive(Clone, Copy)]
pub struct SwarGroup(u64);

/// Returns a word with the high bit set in every lane of `word` that is
/// zero.
#[inline(always)]
fn swar_zero_lanes(word: u64) -> u64 {
    word.wrapping_sub(SWAR_ONES) & !word & SWAR_HIGH_BITS
}

impl Group for SwarGroup {
    const WIDTH: usize = 8;
    const STRIDE_SHIFT: u32 = 3;

    #[inline(always)]
    unsafe fn load(ctrl: *const u8) -> Self {
        // SAFETY: The caller guarantees `ctrl` is valid for reads of 8
        // bytes.
        let bytes = unsafe { core::ptr::read_unaligned(ctrl.cast::<[u8; 8]>()) };
        SwarGroup(u64::from_le_bytes(bytes))
    }

    #[inline(always)]
    fn match_tag(self, tag: u8) -> BitMask<Self> {
        let repeated = u64::from(tag) * SWAR_ONES;
        BitMask::from_word(swar_zero_lanes(self.0 ^ repeated))
    }

    #[inline(always)]
    fn first_empty(self) -> usize {
        let empties = swar_zero_lanes(self.0);
        if empties == 0 {
            Self::WIDTH
        } else {
            (empties.trailing_zeros() >> 3) as usize
        }
    }
}

cfg_if! {
    if #[cfg(all(
        any(target_arch = "x86", target_arch = "x86_64"),
        target_feature = "sse2"
    ))] {
        /// Hardware matcher scanning 16 control bytes with SSE2.
        #[derive(Clone, Copy)]
        pub struct Sse2Group(__m128i);

        impl Group for Sse2Group {
            const WIDTH: usize = 16;
            const STRIDE_SHIFT: u32 = 0;

            #[inline(always)]
            unsafe fn load(ctrl: *const u8) -> Self {
                // SAFETY: The caller guarantees `ctrl` is valid for reads
                // of 16 bytes; `_mm_loadu_si128` has no alignment
                // requirement.
                unsafe { Sse2Group(_mm_loadu_si128(ctrl as *const __m128i)) }
            }

            #[inline(always)]
            fn match_tag(self, tag: u8) -> BitMask<Self> {
                // SAFETY: SSE2 is statically enabled for this backend.
                let mask = unsafe {
                    let cmp = _mm_cmpeq_epi8(self.0, _mm_set1_epi8(tag as i8));
                    _mm_movemask_epi8(cmp) as u16
                };
                BitMask::from_word(u64::from(mask))
            }

            #[inline(always)]
            fn first_empty(self) -> usize {
                // SAFETY: SSE2 is statically enabled for this backend.
                let mask = unsafe {
                    let cmp = _mm_cmpeq_epi8(self.0, _mm_setzero_si128());
                    _mm_movemask_epi8(cmp) as u16
                };
                if mask == 0 {
                    Self::WIDTH
                } else {
                    mask.trailing_zeros() as usize
                }
            }
        }

        /// The widest matcher available for the compilation target.
        pub type DefaultGroup = Sse2Group;
    } else {
        /// The widest matcher available for the compilation target.
        pub type DefaultGroup = SwarGroup;
    }
}
