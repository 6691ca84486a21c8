//! Reference bundles built from real transactions.
//!
//! `HEX_BUNDLE` carries a legacy transaction as hexadecimal in five segments;
//! `ENCODED_BUNDLE` carries a segregated-witness transaction as encoded text in
//! four segments with a testnet hint. The `CORRUPT_*` variants alter the first
//! character of segment zero.

use std::num::NonZeroU32;

use txrelay::segment::{BundleHeader, Segment, SegmentIndex};

/// A bundle ready to be split into segments.
#[derive(Clone, Copy, Debug)]
pub struct BundleVector {
    /// Bundle identifier.
    pub id: &'static str,
    /// Expected transaction identifier.
    pub fingerprint: &'static str,
    /// Network hint carried by segment zero.
    pub network: Option<&'static str>,
    /// Segment payloads in index order.
    pub payloads: &'static [&'static str],
    /// Hex of the full raw transaction.
    pub raw_tx: &'static str,
}

impl BundleVector {
    /// Copy of this vector under another bundle id.
    #[must_use]
    pub const fn with_id(mut self, id: &'static str) -> Self {
        self.id = id;
        self
    }

    /// Number of segments.
    #[must_use]
    pub fn total(&self) -> u32 { u32::try_from(self.payloads.len()).expect("few segments") }

    /// Segment at `index`, with the header attached to segment zero.
    #[must_use]
    pub fn segment(&self, index: usize) -> Segment {
        let payload = self.payloads[index];
        if index == 0 {
            let mut header =
                BundleHeader::new(NonZeroU32::new(self.total()).expect("non-empty"), self.fingerprint);
            header.network = self.network.map(str::to_owned);
            Segment::first(self.id, header, payload)
        } else {
            let index = SegmentIndex::new(u32::try_from(index).expect("small index"));
            Segment::continuation(self.id, index, payload).expect("non-zero index")
        }
    }

    /// All segments in index order.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> { (0..self.payloads.len()).map(|i| self.segment(i)).collect() }
}

const LEGACY_RAW: &str = "0100000001c69b800a73bf8016aef958994a4a1227849122d309c03c9cb3ed1bc350ff8151000000006a473044022061bb12434713c4a04ebe1068301c01caf154362b9503913a17312e93bb2b568f02200a31e7a91a257065aaebd49636de5a4b13524c1f49d75b44ad13d161db80eb3801210240d1bd817f2f862ceb39058119c1290effa325011d81718330a3318a26b12ecaffffffff02934a5700000000001976a914caa5aced5e82cd7af3d72a905aecc9b501ad3f3988acaf2782000000000017a914b385c8d94e28fb8bf21a1cb2933582f7321fafb98700000000";

const SEGWIT_RAW: &str = "010000000001014574baee4d76c9d4efa29bda2e8544929d4ebdb47bb50cd7de5ab7fbc56720f401000000171600146564385fa70f5602bfc3c7017b57853a32cbcb30ffffffff02315c81410000000017a914992165adfc8bef5ace6ed97a76bd9f516e1e3ace87009435770000000017a9144a9ce476ce6087329f1158c2671c1ea784f0b6e0870247304402207932faaeee6a3631ded2dfcaec3736f75f23bec9d1b6e3ecc55bb3c3258dfcbe0220313972c5c9342c18a14c88861422718ccdb109b746ab8fe0ba22dfaf9997c057012102e83e74fff3049ea605d1d64242d5193a21c69b4fa388f36d304e1493e4ac00ec00000000";

/// Identifier of the legacy transaction.
pub const LEGACY_TXID: &str = "fa6ffa1b50c7638c692de20b9a6a0e2f7d5ae760c05201fc3307b1f9f84e020d";

/// Identifier of the segregated-witness transaction.
pub const SEGWIT_TXID: &str = "31fe18833073f818846ef56d663920f835b84ec5a9a28a18dd13b7da0f7339ae";

/// Legacy transaction identifier as encoded text.
pub const LEGACY_TXID_ENCODED: &str = "}FViHp@^78x!wrLNRAr=EoL/wZ!$jhgy7hX{!y(1";

const HEX_SEGMENTS: [&str; 5] = [
    "0100000001c69b800a73bf8016aef958994a4a1227849122d3",
    "09c03c9cb3ed1bc350ff8151000000006a473044022061bb12434713c4a04ebe1068301c01caf154362b9503913a17312e93bb2b568f02200a31e7a91a257065aa",
    "ebd49636de5a4b13524c1f49d75b44ad13d161db80eb3801210240d1bd817f2f862ceb39058119c1290effa325011d81718330a3318a26b12ecaffffffff02934a",
    "5700000000001976a914caa5aced5e82cd7af3d72a905aecc9b501ad3f3988acaf2782000000000017a914b385c8d94e28fb8bf21a1cb2933582f7321fafb98700",
    "000000",
];

const CORRUPT_HEX_SEGMENTS: [&str; 5] = [
    "1100000001c69b800a73bf8016aef958994a4a1227849122d3",
    HEX_SEGMENTS[1],
    HEX_SEGMENTS[2],
    HEX_SEGMENTS[3],
    HEX_SEGMENTS[4],
];

const ENCODED_SEGMENTS: [&str; 4] = [
    "0rr910099?BH{)mCfen5Qmo<?G*.8{pqa2YWg7Wz",
    "tdsyFxcu*E0000n7624Wwh)}]4]@+D.]z!8sa@W<+GzQt%nS92f<Gn}000007Pwapa.v!NI%<&{zRotVY}net9Y?P40f/u+000007Pw9vOAa>sv23If5M([.",
    "93h2h[v4ng0.j}j0W8+z}Mxm3hzK7p?]+pAhUQM6Zra^h<lT-?V+[8G@jSjPf/:o[:UUK=P?Hn%6E4KQ=9mO:mYRQdX*34nNu$Y<0u?Kdk6l?@1FhE]^BHSJ",
    "!FQy>-*Y=0I1tEqp85]MTn}O!0000",
];

const CORRUPT_ENCODED_SEGMENTS: [&str; 4] = [
    "1rr910099?BH{)mCfen5Qmo<?G*.8{pqa2YWg7Wz",
    ENCODED_SEGMENTS[1],
    ENCODED_SEGMENTS[2],
    ENCODED_SEGMENTS[3],
];

/// Legacy transaction in five hexadecimal segments.
pub const HEX_BUNDLE: BundleVector = BundleVector {
    id: "hex-bundle",
    fingerprint: LEGACY_TXID,
    network: None,
    payloads: &HEX_SEGMENTS,
    raw_tx: LEGACY_RAW,
};

/// Segregated-witness transaction in four encoded segments for testnet.
pub const ENCODED_BUNDLE: BundleVector = BundleVector {
    id: "encoded-bundle",
    fingerprint: SEGWIT_TXID,
    network: Some("t"),
    payloads: &ENCODED_SEGMENTS,
    raw_tx: SEGWIT_RAW,
};

/// [`HEX_BUNDLE`] with its leading hexit altered.
pub const CORRUPT_HEX_BUNDLE: BundleVector = BundleVector {
    id: "corrupt-hex-bundle",
    payloads: &CORRUPT_HEX_SEGMENTS,
    ..HEX_BUNDLE
};

/// [`ENCODED_BUNDLE`] with its leading character altered.
pub const CORRUPT_ENCODED_BUNDLE: BundleVector = BundleVector {
    id: "corrupt-encoded-bundle",
    payloads: &CORRUPT_ENCODED_SEGMENTS,
    ..ENCODED_BUNDLE
};
