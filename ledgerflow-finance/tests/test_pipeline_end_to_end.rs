use ledgerflow_core::{Source, YearMonth, DEFAULT_CATEGORY, IGNORE_CATEGORY};
use ledgerflow_finance::{
    read_batches, AggregateOptions, Pipeline, PipelineConfig, RulePrecedence,
};
use ledgerflow_ingest::IngestOptions;
use std::fs;
use std::path::{Path, PathBuf};

fn alipay_export(rows: &[&str]) -> Vec<u8> {
    let mut text: String = (0..24).map(|i| format!("支付宝交易记录明细查询 {i}\n")).collect();
    text.push_str("交易时间,交易分类,交易对方,对方账号,商品说明,收/支,金额,收/付款方式,交易状态,\n");
    for r in rows {
        text.push_str(r);
        text.push('\n');
    }
    encoding_rs::GBK.encode(&text).0.into_owned()
}

fn wechat_export(rows: &[&str]) -> String {
    let mut text: String = (0..16).map(|i| format!("微信支付账单明细 {i}\n")).collect();
    text.push_str("交易时间,交易类型,交易对方,商品,收/支,金额(元),支付方式,当前状态,交易单号,商户单号,备注\n");
    for r in rows {
        text.push_str(r);
        text.push('\n');
    }
    text
}

fn jd_export(rows: &[&str]) -> String {
    let mut text: String = (0..21).map(|i| format!("京东交易流水 {i}\n")).collect();
    text.push_str("交易时间,商户名称,交易说明,金额,收/付款方式,交易状态,收/支,交易分类,交易订单号,商家订单号,备注\n");
    for r in rows {
        text.push_str(r);
        text.push('\n');
    }
    text
}

struct Workspace {
    _tmp: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new(rules: &str, family: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        for dir in ["alipay_files", "wechat_files", "jd_files"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("categories.txt"), rules).unwrap();
        fs::write(root.join("family_accounts.txt"), family).unwrap();
        Self { _tmp: tmp, root }
    }

    fn write(&self, rel: &str, bytes: impl AsRef<[u8]>) {
        fs::write(self.root.join(rel), bytes).unwrap();
    }

    fn dirs(&self) -> Vec<(Source, PathBuf)> {
        vec![
            (Source::Alipay, self.root.join("alipay_files")),
            (Source::WeChat, self.root.join("wechat_files")),
            (Source::Jd, self.root.join("jd_files")),
        ]
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::load(&config(&self.root)).unwrap()
    }
}

fn config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        rules_path: root.join("categories.txt"),
        family_path: root.join("family_accounts.txt"),
        precedence: RulePrecedence::LastMatch,
        aggregate: AggregateOptions::default(),
    }
}

/// One 100-unit expense per source, same month, all hitting one rule.
#[test]
fn test_three_sources_sum_into_one_month_and_category() {
    let ws = Workspace::new("日用:便利店\n", "妈妈\n");
    ws.write(
        "alipay_files/a.csv",
        alipay_export(&["2024-06-03 10:00:00,日用百货,全家便利店,x@y.com,饮料,支出,100.00,花呗,交易成功,"]),
    );
    ws.write(
        "wechat_files/w.csv",
        wechat_export(&["2024-06-10 12:00:00,商户消费,罗森便利店,便当,支出,¥100.00,零钱,支付成功,1,2,/"]),
    );
    ws.write(
        "jd_files/j.csv",
        jd_export(&["2024-06-20 18:30:00,711便利店,零食,100.00,白条,交易成功,支出,食品,3,4,"]),
    );

    let batches = read_batches(&ws.dirs(), &IngestOptions::default()).unwrap();
    assert_eq!(batches.total(), 3);

    let analysis = ws.pipeline().run(batches);
    let june = YearMonth::new(2024, 6).unwrap();
    assert_eq!(analysis.summary.monthly[&june], 300.0);
    assert_eq!(analysis.summary.by_category["日用"], 300.0);
    assert!(analysis.records.iter().all(|t| t.month == Some(june)));
}

#[test]
fn test_family_and_ignore_rules_with_monthly_scope() {
    let ws = Workspace::new("转账:妈妈|爸爸\n餐饮:面\n", "妈妈\n");
    ws.write(
        "alipay_files/a.csv",
        alipay_export(&[
            "2024-07-01 09:00:00,转账红包,妈妈,m@x.com,生活费,支出,500.00,余额,交易成功,",
            "2024-07-02 12:00:00,餐饮美食,面馆,,牛肉面,支出,25.00,花呗,交易成功,",
            "2024-07-03 12:00:00,餐饮美食,面馆,,拌面,支出,18.00,花呗,交易关闭,",
        ]),
    );
    ws.write(
        "wechat_files/w.csv",
        wechat_export(&[
            "2024-07-05 20:00:00,商户消费,京东,京东-订单编号8812,支出,¥60.00,零钱,支付成功,1,2,/",
            "2024-07-06 20:00:00,零钱通,零钱通,转入零钱通,/,¥1000.00,零钱,支付成功,3,4,/",
        ]),
    );
    ws.write(
        "jd_files/j.csv",
        jd_export(&[
            "2024-07-05 19:59:00,京东自营,数据线,80.00(已退款20.00),白条,交易成功,支出,数码,5,6,",
            "2024-07-08 10:00:00,京东自营,赠品,--,白条,交易成功,支出,数码,7,8,",
        ]),
    );

    let batches = read_batches(&ws.dirs(), &IngestOptions::default()).unwrap();
    let analysis = ws.pipeline().run(batches);
    let by_desc = |d: &str| analysis.records.iter().find(|t| t.description == d).unwrap();

    // family beats the keyword rule
    assert_eq!(by_desc("生活费").category, IGNORE_CATEGORY);
    assert_eq!(by_desc("牛肉面").category, "餐饮");
    // closed status overrides the keyword rule
    assert_eq!(by_desc("拌面").category, IGNORE_CATEGORY);
    assert_eq!(by_desc("京东-订单编号8812").category, IGNORE_CATEGORY);
    assert_eq!(by_desc("转入零钱通").category, IGNORE_CATEGORY);
    assert_eq!(by_desc("数据线").amount, 60.0);
    assert_eq!(by_desc("数据线").category, DEFAULT_CATEGORY);
    // unparseable JD amount kept as zero, then excluded
    assert_eq!(by_desc("赠品").amount, 0.0);
    assert_eq!(by_desc("赠品").category, IGNORE_CATEGORY);

    // monthly keeps ignored expenses: 500 + 25 + 18 + 60 (wechat) + 60 (jd)
    let july = YearMonth::new(2024, 7).unwrap();
    assert_eq!(analysis.summary.monthly[&july], 663.0);
    assert_eq!(analysis.summary.by_category[IGNORE_CATEGORY], 578.0);
    assert_eq!(analysis.summary.by_category["餐饮"], 25.0);
    assert!(!analysis.summary.by_counterparty.contains_key("零钱通"));
}

#[test]
fn test_excluding_ignored_scope() {
    let ws = Workspace::new("餐饮:面\n", "妈妈\n");
    ws.write(
        "alipay_files/a.csv",
        alipay_export(&[
            "2024-07-01 09:00:00,转账红包,妈妈,m@x.com,生活费,支出,500.00,余额,交易成功,",
            "2024-07-02 12:00:00,餐饮美食,面馆,,牛肉面,支出,25.00,花呗,交易成功,",
        ]),
    );
    let mut cfg = config(&ws.root);
    cfg.aggregate = AggregateOptions { include_ignored: false };
    let pipeline = Pipeline::load(&cfg).unwrap();
    let analysis = pipeline.run(read_batches(&ws.dirs(), &IngestOptions::default()).unwrap());

    let july = YearMonth::new(2024, 7).unwrap();
    assert_eq!(analysis.summary.monthly[&july], 25.0);
    assert!(!analysis.summary.by_category.contains_key(IGNORE_CATEGORY));
}
