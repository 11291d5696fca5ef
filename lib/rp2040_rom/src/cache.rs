use core::sync::atomic::{AtomicUsize, Ordering};

use crate::bus::RomBus;
use crate::code::RomCode;
use crate::lookup::{rom_func_lookup_in, RomAddress};

/// Remembers where one function code resolved to.
///
/// Only a successful lookup is stored; a miss is looked up again next time.
/// Meant to live in a `static` and to be used with a single bus.
#[derive(Debug)]
pub struct CachedLookup {
    code: RomCode,
    addr: AtomicUsize,
}

impl CachedLookup {
    pub const fn new(code: RomCode) -> Self {
        Self {
            code,
            addr: AtomicUsize::new(0),
        }
    }

    pub fn code(&self) -> RomCode {
        self.code
    }

    pub fn get_in<B: RomBus + ?Sized>(&self, bus: &B) -> Option<RomAddress> {
        // load/store only, thumbv6m has no compare-and-swap
        if let Some(addr) = RomAddress::new(self.addr.load(Ordering::Relaxed)) {
            return Some(addr);
        }
        let found = rom_func_lookup_in(bus, self.code)?;
        self.addr.store(found.addr(), Ordering::Relaxed);
        Some(found)
    }

    pub fn clear(&self) {
        self.addr.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRom;

    #[test]
    fn resolves_once() {
        let rom = SimRom::builder().function(*b"FC", 0x2455).build();
        let cache = CachedLookup::new(RomCode::from_tag(*b"FC"));

        assert_eq!(cache.get_in(&rom).map(RomAddress::addr), Some(0x2455));
        assert_eq!(cache.get_in(&rom).map(RomAddress::addr), Some(0x2455));
        assert_eq!(rom.dispatch_calls(), 1);

        cache.clear();
        assert_eq!(cache.get_in(&rom).map(RomAddress::addr), Some(0x2455));
        assert_eq!(rom.dispatch_calls(), 2);
    }

    #[test]
    fn miss_is_not_cached() {
        let rom = SimRom::builder().function(*b"FC", 0x2455).build();
        let cache = CachedLookup::new(RomCode::from_tag(*b"WV"));

        assert_eq!(cache.get_in(&rom), None);
        assert_eq!(cache.get_in(&rom), None);
        assert_eq!(rom.dispatch_calls(), 2);
    }

    #[test]
    fn shared_between_threads() {
        let rom = SimRom::builder().function(*b"P3", 0x1d09).build();
        let cache = CachedLookup::new(RomCode::from_tag(*b"P3"));

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!(cache.get_in(&rom).map(RomAddress::addr), Some(0x1d09));
                    }
                });
            }
        });
        // racing first lookups may each go to the ROM, later ones never do
        assert!(rom.dispatch_calls() <= 4);
    }
}
