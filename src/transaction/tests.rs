//! Unit tests for Bitcoin transaction identification.

use rstest::rstest;

use super::{BitcoinFormat, TransactionError, TransactionFormat};

const LEGACY: &str = "0100000001c69b800a73bf8016aef958994a4a1227849122d309c03c9cb3ed1bc350ff8151000000006a473044022061bb12434713c4a04ebe1068301c01caf154362b9503913a17312e93bb2b568f02200a31e7a91a257065aaebd49636de5a4b13524c1f49d75b44ad13d161db80eb3801210240d1bd817f2f862ceb39058119c1290effa325011d81718330a3318a26b12ecaffffffff02934a5700000000001976a914caa5aced5e82cd7af3d72a905aecc9b501ad3f3988acaf2782000000000017a914b385c8d94e28fb8bf21a1cb2933582f7321fafb98700000000";
const SEGWIT: &str = "010000000001014574baee4d76c9d4efa29bda2e8544929d4ebdb47bb50cd7de5ab7fbc56720f401000000171600146564385fa70f5602bfc3c7017b57853a32cbcb30ffffffff02315c81410000000017a914992165adfc8bef5ace6ed97a76bd9f516e1e3ace87009435770000000017a9144a9ce476ce6087329f1158c2671c1ea784f0b6e0870247304402207932faaeee6a3631ded2dfcaec3736f75f23bec9d1b6e3ecc55bb3c3258dfcbe0220313972c5c9342c18a14c88861422718ccdb109b746ab8fe0ba22dfaf9997c057012102e83e74fff3049ea605d1d64242d5193a21c69b4fa388f36d304e1493e4ac00ec00000000";

fn raw(hex_tx: &str) -> Vec<u8> { hex::decode(hex_tx).expect("valid hex") }

#[rstest]
#[case::legacy(LEGACY, "fa6ffa1b50c7638c692de20b9a6a0e2f7d5ae760c05201fc3307b1f9f84e020d")]
#[case::segwit(SEGWIT, "31fe18833073f818846ef56d663920f835b84ec5a9a28a18dd13b7da0f7339ae")]
fn computes_transaction_id(#[case] tx: &str, #[case] expected: &str) {
    assert_eq!(BitcoinFormat.transaction_id(&raw(tx)).expect("parses"), expected);
}

#[test]
fn altered_version_changes_identifier() {
    let mut bytes = raw(LEGACY);
    bytes[0] = 0x11;
    assert_eq!(
        BitcoinFormat.transaction_id(&bytes).expect("still parses"),
        "34e31469a33e7d9359ba4fa2beea65cc7c3d22b574c48767bc246297a5721a64"
    );
}

#[test]
fn rejects_truncated_transaction() {
    let bytes = raw(LEGACY);
    let err = BitcoinFormat
        .transaction_id(&bytes[..bytes.len() - 1])
        .expect_err("lock time cut short");
    assert!(matches!(err, TransactionError::Truncated { needed: 4, .. }));
}

#[test]
fn rejects_trailing_bytes() {
    let mut bytes = raw(LEGACY);
    bytes.push(0);
    assert_eq!(
        BitcoinFormat.transaction_id(&bytes),
        Err(TransactionError::TrailingBytes { count: 1 })
    );
}

#[test]
fn rejects_unknown_witness_flag() {
    let mut bytes = raw(SEGWIT);
    bytes[5] = 0x02;
    assert_eq!(
        BitcoinFormat.transaction_id(&bytes),
        Err(TransactionError::UnsupportedFlag { flag: 0x02 })
    );
}

#[test]
fn rejects_empty_input() {
    assert!(matches!(
        BitcoinFormat.transaction_id(&[]),
        Err(TransactionError::Truncated { offset: 0, .. })
    ));
}
